mod bridge;
mod discord;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use jellyrpc_api::covers::Covers;
use jellyrpc_api::jellyfin::JellyfinClient;
use jellyrpc_core::config::{AppConfig, ConfigOverrides, CoverStrategy};

use crate::bridge::Bridge;
use crate::discord::DiscordPresence;

/// Show what you are playing on Jellyfin as Discord rich presence.
#[derive(Debug, Parser)]
#[command(name = "jellyrpc", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Jellyfin server base URL.
    #[arg(long, env = "JELLYFIN_URL")]
    jellyfin_url: Option<String>,

    #[arg(long, env = "JELLYFIN_API_KEY", hide_env_values = true)]
    jellyfin_api_key: Option<String>,

    /// Only sessions of this user are shown.
    #[arg(long, env = "JELLYFIN_USER_ID")]
    jellyfin_user_id: Option<String>,

    /// Discord application id.
    #[arg(long, env = "DISCORD_CLIENT_ID")]
    discord_client_id: Option<String>,

    /// Enables OMDb posters with `--covers lookup`.
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    omdb_api_key: Option<String>,

    /// Seconds between polls.
    #[arg(short, long)]
    interval: Option<u64>,

    /// Cover art source: direct or lookup.
    #[arg(long)]
    covers: Option<CoverStrategy>,

    /// Where to write the log file.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            jellyfin_url: self.jellyfin_url.clone(),
            jellyfin_api_key: self.jellyfin_api_key.clone(),
            jellyfin_user_id: self.jellyfin_user_id.clone(),
            discord_client_id: self.discord_client_id.clone(),
            omdb_api_key: self.omdb_api_key.clone(),
            poll_interval: self.interval,
            cover_strategy: self.covers,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("jellyrpc: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = cli.log_dir.clone().unwrap_or_else(AppConfig::log_dir);
    let _guard = logging::init_logging(&log_dir, &config.general.log_file);
    tracing::info!("Starting Jellyfin Discord RPC");

    config.apply(cli.overrides());
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }

    let http = jellyrpc_api::http_client();
    let sessions = JellyfinClient::new(&config.jellyfin, http.clone());
    let covers = Covers::from_config(&config, http);
    let transport = DiscordPresence::new(&config.discord.client_id);
    tracing::info!(
        server = %config.jellyfin.url,
        covers = %config.covers.strategy,
        "Configuration loaded"
    );

    let bridge = Bridge::new(
        sessions,
        covers,
        transport,
        Duration::from_secs(config.general.poll_interval),
    );
    bridge.run(shutdown_signal()).await;

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
