//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use reqwest::Client;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::{ArchiveClient, HttpTransfer};
use crate::catalog::{Catalog, CatalogClient};
use crate::config::Config;
use crate::library::LibraryStorage;
use crate::sync::{FormatMode, SyncEngine, SyncOptions, TracingReporter, select_best_source};

fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .build()
        .context("Failed to create HTTP client")
}

/// Handle the `download` command
pub async fn download(
    config: &Config,
    year: String,
    band: Option<String>,
    output: Option<PathBuf>,
    format: Option<FormatMode>,
    highest_rated: bool,
    dry_run: bool,
) -> Result<()> {
    let options = SyncOptions {
        band: band.unwrap_or_else(|| config.band.clone()),
        year,
        format: format.unwrap_or(config.format),
        highest_rated,
        dry_run,
    };
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    tracing::info!(
        "Configuration: band={}, year={}, format={}, output={}, highest-rated={}",
        options.band,
        options.year,
        options.format,
        output.display(),
        options.highest_rated
    );

    let client = http_client(config)?;
    let mut transfer = HttpTransfer::new(client.clone());
    if !io::stderr().is_terminal() {
        transfer = transfer.quiet();
    }

    let engine = SyncEngine::new(
        Arc::new(CatalogClient::new(&config.catalog_url, client.clone())),
        Arc::new(ArchiveClient::new(&config.archive_url, client)),
        Arc::new(transfer),
        LibraryStorage::new(output),
        Arc::new(TracingReporter),
        config.request_delay(),
    );

    let result = engine.sync(&options).await?;

    println!();
    if dry_run {
        println!("{}", "Dry run complete!".yellow().bold());
        println!("  Files that would be checked: {}", result.files_planned);
    } else {
        println!("{}", "Download complete!".green().bold());
        println!("  Files downloaded: {}", result.files_downloaded);
        println!("  Files already present: {}", result.files_skipped);
        println!(
            "  Total size: {:.1} MB",
            result.bytes_downloaded as f64 / 1_048_576.0
        );
    }
    println!("  Shows: {}", result.shows_seen);
    println!("  Sources completed: {}", result.sources_completed);

    if result.sources_skipped > 0 {
        println!(
            "  {}",
            format!("Sources skipped: {}", result.sources_skipped).yellow()
        );
    }
    if result.shows_failed + result.sources_failed + result.files_failed > 0 {
        println!(
            "  {}",
            format!(
                "Failures: {} show(s), {} source(s), {} file(s)",
                result.shows_failed, result.sources_failed, result.files_failed
            )
            .red()
        );
    }

    Ok(())
}

/// Handle the `shows` command
pub async fn shows(config: &Config, year: String, band: Option<String>, sources: bool) -> Result<()> {
    let band = band.unwrap_or_else(|| config.band.clone());
    let catalog = CatalogClient::new(&config.catalog_url, http_client(config)?);

    println!("{}", format!("Fetching shows for {} in {}...", band, year).cyan());
    let shows = catalog
        .get_shows(&band, &year)
        .await
        .context("Failed to fetch shows")?;

    if shows.is_empty() {
        println!("{}", "No shows found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} shows:", shows.len()).green().bold());
    for show in &shows {
        println!(
            "  {} - {}, {}",
            show.display_date.green(),
            show.venue_name(),
            show.venue_location()
        );

        if !sources {
            continue;
        }

        match catalog.get_show(&band, &show.display_date).await {
            Ok(detail) => {
                let best = select_best_source(&detail.sources);
                for source in &detail.sources {
                    let marker = if best.is_some_and(|b| std::ptr::eq(b, source)) {
                        "*".green().bold().to_string()
                    } else {
                        " ".to_string()
                    };
                    let rating = source
                        .avg_rating
                        .map(|r| format!("{:.2}", r))
                        .unwrap_or_else(|| "unrated".to_string());
                    let identifier = source
                        .archive_identifier()
                        .unwrap_or_else(|| "(no archive.org link)".to_string());
                    let kind = if source.is_soundboard { "SBD" } else { "AUD" };
                    let taper = source
                        .taper
                        .as_deref()
                        .map(|t| format!(" (taper: {})", t))
                        .unwrap_or_default();

                    println!("    {} [{}] {} {}{}", marker, rating, kind, identifier, taper);
                }
            }
            Err(e) => {
                println!("    {}", format!("Failed to fetch sources: {:#}", e).red());
            }
        }
    }

    if sources {
        println!();
        println!("{} marks the source used by {}.", "*".green().bold(), "--highest-rated".cyan());
    }

    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "dead-dl", &mut io::stdout());
}

// Extension trait for Cli to get clap Command
impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}
