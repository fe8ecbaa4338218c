use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pagerduty_relay::config::{ConfigManager, ConfigOverrides, FileConfigManager};
use pagerduty_relay::{api, MattermostWebhook, Relay};

/// Relays PagerDuty incident webhooks to a Mattermost incoming webhook
#[derive(Parser, Debug)]
#[command(name = "pagerduty-relay", version, about)]
struct Cli {
    /// Path to the TOML config file, created with defaults if missing
    #[arg(short, long, env = "RELAY_CONFIG", default_value = "relay.toml")]
    config: PathBuf,

    #[arg(long, env = "RELAY_HOST")]
    host: Option<String>,

    #[arg(short, long, env = "RELAY_PORT")]
    port: Option<u16>,

    /// Mattermost incoming webhook URL
    #[arg(long, env = "MATTERMOST_URL")]
    mattermost_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let config_manager = FileConfigManager::new(cli.config).with_overrides(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        mattermost_url: cli.mattermost_url,
    });
    let config = Arc::new(
        config_manager
            .load_config()
            .await
            .context("failed to load configuration")?,
    );

    tracing::info!("Starting PagerDuty relay");

    let webhook = Arc::new(
        MattermostWebhook::new(&config.mattermost).context("failed to set up Mattermost webhook")?,
    );
    let relay = Arc::new(Relay::new(webhook.clone()));

    let served = api::start_server(config.clone(), relay).await;

    // acknowledged events still have deliveries in flight
    webhook.drain(config.mattermost.timeout).await;
    served?;

    tracing::info!("PagerDuty relay stopped.");
    Ok(())
}
