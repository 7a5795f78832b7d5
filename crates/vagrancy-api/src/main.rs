//! # vagrancy: Binary Entry Point
//!
//! Starts the box repository server. Configuration comes from
//! `config.yml` (or `--config`), `VAGRANCY_*` environment variables and
//! command-line flags; see [`vagrancy_api::config`].

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vagrancy_api::config::DEFAULT_CONFIG_FILE;
use vagrancy_api::{AppConfig, AppState};

/// Self-hosted Vagrant box repository.
#[derive(Parser, Debug)]
#[command(name = "vagrancy", version, about)]
struct Cli {
    /// YAML configuration file. Defaults to ./config.yml when present.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Listen address, overriding file and environment.
    #[arg(long, short = 'b')]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_file = cli.config.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.is_file().then_some(default)
    });
    let mut config =
        AppConfig::load(config_file.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    tokio::fs::create_dir_all(&config.filestore_path)
        .await
        .with_context(|| {
            format!(
                "failed to create storage root {}",
                config.filestore_path.display()
            )
        })?;

    tracing::info!(
        storage = %config.filestore_path.display(),
        config_file = ?config_file,
        "storage root ready"
    );

    let app = vagrancy_api::app(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("vagrancy listening on {}", config.bind);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
