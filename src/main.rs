mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use screenpick::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration and restore any persisted session
    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    cli::run(cli.command, &state).await
}
