#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[cfg(not(any(target_os = "macos", unix)))]
compile_error!("Only macos and unix are currently supported");

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use volley::{Controller, VolleyConfig};

/// Dispatch bulk email campaigns at a controlled rate
#[derive(Parser, Debug)]
#[command(name = "volley")]
#[command(about = "Dispatch bulk email campaigns at a controlled rate", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (RON). Without it, `VOLLEY_CONFIG` and
    /// the usual locations are searched, falling back to defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a campaign file and run it to completion
    Run {
        /// Campaign file (RON) with the message template and recipient list
        #[arg(long)]
        campaign: PathBuf,

        /// Override the file's messages-per-minute rate limit
        #[arg(short, long)]
        rate: Option<u32>,

        /// Pick up an interrupted campaign instead of importing it fresh
        #[arg(long)]
        resume: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    volley_common::logging::init();

    let cli = Cli::parse();
    let config = VolleyConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            campaign,
            rate,
            resume,
        } => {
            let summary = Controller::new(&config).run(&campaign, rate, resume).await?;
            println!("{summary}");
        }
    }

    Ok(())
}
