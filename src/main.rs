mod binary_resolver;
mod config;
mod errors;
mod media;
mod mutation;
mod path_guard;
mod server;
mod thumbnails;

use anyhow::Context;
use clap::Parser;
use config::{Cli, Config};
use once_cell::sync::OnceCell;
use server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

fn json_logs_requested() -> bool {
    ["UP_STAGE", "LK_LOG_JSON"]
        .iter()
        .any(|key| std::env::var_os(key).is_some_and(|v| !v.is_empty()))
}

fn init_logging() {
    static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let _ = GUARD.set(guard);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking);
    let result = if json_logs_requested() {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to init tracing subscriber: {e}");
    }
}

/// Bare host names get `.local` so other machines on the LAN can resolve them via mDNS.
fn lan_host(hostname: &str) -> String {
    if hostname.contains('.') {
        hostname.to_string()
    } else {
        format!("{hostname}.local")
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::from_cli(cli).context("invalid configuration")?;
    info!(
        root = %config.root.display(),
        thumbs = %config.thumb_dir.display(),
        trash = %config.trash_dir.display(),
        "starting"
    );

    let bind = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState::new(config));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let (local, handle) = server::start_http_server(state, bind, shutdown_rx)
        .await
        .with_context(|| format!("failed to listen on {bind}"))?;

    let host = lan_host(&sysinfo::System::host_name().unwrap_or_else(|| "localhost".into()));
    println!("Serving from http://{host}:{}", local.port());

    shutdown_signal().await;
    info!("shutting down");
    let _ = shutdown_tx.send(true);
    handle.await.context("server task failed")?;
    Ok(())
}
