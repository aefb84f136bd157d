//! pipeup - push-to-deploy onboarding for GitHub repositories
//!
//! Available as the `pup` command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pipeup::cli::commands::{Cli, Commands};
use pipeup::cli::up;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Up(args) => up::handle_up(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
