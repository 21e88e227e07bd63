mod cli;
mod startup;

use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let cli = cli::Cli::parse();

    // Load configuration
    let config = startup::load_config()?;

    info!("Starting salon-booking");
    startup::run(cli, config).await
}
