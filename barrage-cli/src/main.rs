//! Barrage CLI
//!
//! Command-line interface for driving load jobs on a Barrage orchestrator.

mod commands;
mod config;
mod id_resolver;
mod summary;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "barrage")]
#[command(about = "Barrage HTTP load generator CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(long, env = "BARRAGE_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        orchestrator_url: cli.url,
    };

    handle_command(cli.command, &config).await
}
