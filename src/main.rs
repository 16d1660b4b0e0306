//! settex - portable settings interchange
//!
//! Command-line tool for exporting, discovering, and importing application
//! settings as human-shareable text blobs.

use clap::Parser;
use settex::cli::Cli;
use settex::config::Config;
use settex::error::Result;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    // Execute the command
    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().await?;
    cli.execute(config).await
}

fn init_logging(debug: bool) {
    let default_directive = if debug { "settex=debug" } else { "settex=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        // keep stdout clean for exported blobs
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
