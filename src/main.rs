// Entry point for the admin console
use clap::Parser;
use tp_console::client::cli_client::{self, Cli};
use tp_console::ConsoleConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // reads .env too, so LOG_LEVEL and KEYRING_FALLBACK can live there
    let config = ConsoleConfig::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let cli = Cli::parse();
    cli_client::run(cli, config).await
}
