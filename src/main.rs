mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;

use cli::{Cli, BUILD_VERSION};
use config::Config;
use datasources::{InfluxClient, WebhookClient};
use error::Result;
use logic::{TriggerService, TriggerSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if cli.version {
        println!("{}", BUILD_VERSION);
        return;
    }

    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&cli).await {
        tracing::error!(op = e.op(), error = %e, action = %cli.action, "robovac-trigger failed");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    tracing::debug!(path = %cli.config.display(), ?config, "configuration loaded");

    let influx = InfluxClient::connect(&config.influxdb)?;
    let settings = TriggerSettings::from_config(&config, cli.action)?;
    let webhook = WebhookClient::new(config.vacuum.skip_verify_ssl)?;

    let service = TriggerService::new(influx, webhook, settings);
    service.run(cli.action).await?;

    Ok(())
}
