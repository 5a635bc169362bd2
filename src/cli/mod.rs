//! CLI module for dead-dl

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::sync::FormatMode;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "dead-dl", about = "Download live concert recordings from Relisten and archive.org")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/dead-dl/config.json)
    #[arg(long, global = true, env = "DEAD_DL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every show of a year
    Download {
        /// Year to download
        #[arg(short, long)]
        year: String,

        /// Band slug (e.g. grateful-dead)
        #[arg(short, long)]
        band: Option<String>,

        /// Output directory for downloads
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preferred format
        #[arg(short, long, value_enum)]
        format: Option<FormatMode>,

        /// Download only the highest rated source per show
        #[arg(long)]
        highest_rated: bool,

        /// Dry run - show what would be downloaded without downloading
        #[arg(long)]
        dry_run: bool,
    },

    /// List the shows of a year
    Shows {
        /// Year to list
        #[arg(short, long)]
        year: String,

        /// Band slug (e.g. grateful-dead)
        #[arg(short, long)]
        band: Option<String>,

        /// Also list each show's sources and ratings
        #[arg(short, long)]
        sources: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
