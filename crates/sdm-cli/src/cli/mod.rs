//! CLI for the SDM segmented downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_completions, run_get, run_man, run_plan};

/// Top-level CLI for the SDM segmented downloader.
#[derive(Debug, Parser)]
#[command(name = "sdm")]
#[command(about = "SDM: concurrent segmented file downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL in parallel byte-range sections.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Output file (default: last URL path segment in the current directory).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Number of sections, i.e. parallel connections (default from config).
        #[arg(short = 'n', long, value_name = "N")]
        sections: Option<usize>,
    },

    /// Print the byte ranges a download of SIZE bytes would be split into.
    Plan {
        /// Resource size in bytes.
        size: u64,

        /// Number of sections (default from config).
        #[arg(short = 'n', long, value_name = "N")]
        sections: Option<usize>,

        /// Print the ranges as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                url,
                output,
                sections,
            } => run_get(&url, output, sections).await?,
            CliCommand::Plan {
                size,
                sections,
                json,
            } => run_plan(size, sections, json)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
