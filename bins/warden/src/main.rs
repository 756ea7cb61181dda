use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use warden_heartbeat::{SqlHeartbeatStore, StoreHeartbeatProbe};
use warden_notify::NotificationRouter;
use warden_supervision::{Supervisor, SystemProbe, WatchdogConfig};

/// Warden - watchdog supervisor for external programs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug)?;

    info!("starting warden");
    info!("config file: {}", args.config);

    // Configuration problems are fatal. On an interactive console, hold
    // the window open until the operator has seen the error.
    let config = match WatchdogConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {:#}", e);
            wait_for_acknowledgment();
            std::process::exit(1);
        }
    };

    info!("supervising {} target(s)", config.targets.len());

    let notifier = NotificationRouter::from_config(config.notifications.as_ref());
    let heartbeat = Arc::new(StoreHeartbeatProbe::new(SqlHeartbeatStore::new()));
    let liveness = Box::new(SystemProbe::new());

    let mut supervisor = Supervisor::new(config, liveness, heartbeat, notifier);

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    // Runs until the shutdown token fires; the in-flight tick always
    // completes first, so no target is left killed but not relaunched.
    supervisor.run(shutdown).await;

    info!("warden stopped");
    Ok(())
}

fn initialize_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();

    Ok(())
}

/// Block on Enter when stderr is an interactive console; exit immediately
/// otherwise (pausing under a service manager would hang restarts).
fn wait_for_acknowledgment() {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("press Enter to exit");
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_termination_signal().await;
        shutdown.cancel();
    });
}

async fn wait_for_termination_signal() {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                return std::future::pending().await;
            }
        };
        let mut sigint = match signal::unix::signal(signal::unix::SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to install SIGINT handler: {}", e);
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
    }

    #[cfg(windows)]
    {
        let _ = signal::ctrl_c().await;
        info!("received Ctrl+C");
    }
}
