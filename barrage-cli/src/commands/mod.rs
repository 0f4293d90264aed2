//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod run;

pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a load job and follow it to the end
    Run(RunArgs),
    /// Poll a job once and print what is new
    Status {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Cancel a running job
    Cancel {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// List retained jobs
    List,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        Commands::Run(args) => run::handle_run(args, &client).await,
        Commands::Status { id } => job::show_status(&client, &id).await,
        Commands::Cancel { id } => job::cancel(&client, &id).await,
        Commands::List => job::list(&client).await,
    }
}
