//! Jukebox server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use jukebox_core::config::AppConfig;
use jukebox_server::bootstrap::build_state;
use jukebox_server::{ServiceRole, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Jukebox - MP3 resource and song metadata services
#[derive(Parser, Debug)]
#[command(name = "jukeboxd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "JUKEBOX_CONFIG",
        default_value = "config/jukebox.toml"
    )]
    config: String,

    /// Services to expose
    #[arg(short, long, env = "JUKEBOX_ROLE", value_enum, default_value = "combined")]
    role: ServiceRole,
}

/// Load configuration from an optional TOML file and `JUKEBOX_` environment variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if std::path::Path::new(path).exists() {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::info!(config_path = %path, "No config file found, using defaults and environment");
    }

    figment
        .merge(Env::prefixed("JUKEBOX_").split("__"))
        .extract()
        .context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(role = args.role.as_str(), "Jukebox v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    let state = build_state(config, args.role).await?;

    let _reconcile_handle = match (state.reconcile_interval(), &state.orchestrator) {
        (Some(interval), Some(orchestrator)) => {
            tracing::info!(
                interval_secs = interval.as_secs(),
                "Metadata reconciliation task spawned"
            );
            Some(orchestrator.reconciler().clone().spawn(interval))
        }
        _ => None,
    };

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
