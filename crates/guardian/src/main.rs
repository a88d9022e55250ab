//! Edgebar Guardian
//!
//! Detached watchdog launched by the daemon. It waits for the daemon to
//! exit, however that happens, and then runs the shutdown automation once.
//! It has no console, so it logs to a daily rolling file.

mod watchdog;

use anyhow::{Context, Result};
use clap::Parser;
use edgebar_config::{log_dir, resolve_data_dir, Config, Trigger};
use edgebar_platform_win32::{NativePlatform, PlatformQuery};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use watchdog::Watchdog;

const LOG_FILE: &str = "guardian.log";

#[derive(Parser)]
#[command(name = "edgebar-guardian")]
#[command(author, version, about = "Runs edgebar shutdown tasks after the daemon exits")]
struct Args {
    /// Process ID of the daemon to watch
    #[arg(long)]
    pid: u32,

    /// Data directory holding config.json, scripts and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Log to `<data_dir>/logs/guardian.log`. Keep the guard alive until exit.
fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    let dir = log_dir(data_dir);
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(guard)
}

/// Interrupts aimed at the daemon's console must not take us down with it.
fn ignore_interrupts() {
    tokio::spawn(async {
        while tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt ignored, still watching");
        }
    });

    #[cfg(unix)]
    tokio::spawn(async {
        use tokio::signal::unix::{signal, SignalKind};

        let Ok(mut hangup) = signal(SignalKind::hangup()) else {
            warn!("Failed to install hangup handler");
            return;
        };
        while hangup.recv().await.is_some() {
            info!("Hangup ignored, still watching");
        }
    });
}

async fn run_shutdown_tasks(data_dir: &Path) {
    // Re-read the config: it may have changed while the daemon ran.
    let config = Config::load(data_dir).unwrap_or_else(|e| {
        warn!("Failed to load configuration: {}. Using defaults.", e);
        Config::default()
    });
    let report = edgebar_automation::run_trigger(&config.automatic, Trigger::Shutdown, data_dir).await;
    info!(succeeded = report.succeeded, failed = report.failed, "Shutdown tasks finished");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = resolve_data_dir(args.data_dir);
    let _guard = init_logging(&data_dir)?;

    ignore_interrupts();
    info!(pid = args.pid, "Guardian watching daemon");

    let platform = NativePlatform;
    Watchdog::new(args.pid, move |pid| platform.is_process_alive(pid))
        .run(|| run_shutdown_tasks(&data_dir))
        .await;

    info!("Guardian exiting");
    Ok(())
}
