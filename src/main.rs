//! dead-dl - Download live concert recordings from Relisten and archive.org

use anyhow::Result;
use clap::Parser;

mod archive;
mod catalog;
mod cli;
mod config;
mod library;
mod logging;
mod sync;
mod utils;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    if let Commands::Completion { shell } = cli.command {
        cli::commands::completion(shell);
        return Ok(());
    }

    if let Some(path) = logging::init(cli.verbose, &config.log_dir) {
        tracing::debug!("Logging to {}", path.display());
    }

    match cli.command {
        Commands::Download {
            year,
            band,
            output,
            format,
            highest_rated,
            dry_run,
        } => {
            tracing::info!("=== dead-dl started ===");
            cli::commands::download(&config, year, band, output, format, highest_rated, dry_run).await?;
        }
        Commands::Shows { year, band, sources } => {
            cli::commands::shows(&config, year, band, sources).await?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(())
}
