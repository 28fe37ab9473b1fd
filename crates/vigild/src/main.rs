//! vigild — the Vigil health-monitoring daemon.
//!
//! Loads the monitor config, sends a startup notification, then polls every
//! configured health endpoint on a fixed interval and posts an alert to the
//! webhook whenever a new failure appears or everything recovers.
//!
//! # Usage
//!
//! ```text
//! vigild --config /etc/vigil/config.json
//! ```
//!
//! The config file is re-read between cycles when it changes. SIGINT or
//! SIGTERM stops the daemon with exit code 0; an unusable config at startup
//! exits with code 1.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use vigil_core::FileConfigProvider;
use vigil_health::{HttpProbe, Scheduler};
use vigil_http::{HttpClient, TlsConfig};
use vigil_notify::WebhookNotifier;

/// `vigil` prefix-matches every workspace crate, the daemon included.
const DEFAULT_FILTER: &str = "info,vigil=debug";

#[derive(Parser)]
#[command(name = "vigild", about = "Vigil health-monitoring daemon", version)]
struct Cli {
    /// Path to the monitor config (JSON, or TOML with a `.toml` extension).
    #[arg(long, short, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER))?,
        )
        .init();

    let cli = Cli::parse();

    let provider = FileConfigProvider::open(&cli.config)
        .with_context(|| format!("config load error ({})", cli.config.display()))?;
    let config = provider.config().clone();

    // Transport settings are fixed for the lifetime of the process; reloads
    // only affect targets, webhook and interval.
    let tls = TlsConfig::from_settings(config.tls.insecure)?;
    if tls.is_insecure() {
        warn!("TLS certificate verification is disabled for all requests");
    }
    let client = HttpClient::new(tls, config.request_timeout());

    let scheduler = Scheduler::new(
        provider,
        HttpProbe::new(client.clone()),
        WebhookNotifier::new(client, config.notifier.timezone_offset_minutes),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_handle = tokio::spawn(scheduler.run(shutdown_rx));

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);
    let _ = monitor_handle.await;

    info!("vigil daemon stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("caught SIGINT, exiting"),
        _ = terminate => info!("caught SIGTERM, exiting"),
    }
}
