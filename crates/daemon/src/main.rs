//! Edgebar Daemon
//!
//! Host process for the edgebar sidebar.
//!
//! Responsibilities:
//! - Own the sidebar engine (progress, gestures, animations)
//! - Mirror computed geometry onto the renderer's window
//! - Handle IPC commands from the renderer, settings UI and CLI
//! - Push configuration changes to subscribers
//! - Track monitors and the foreground window
//! - Launch the guardian and the startup automation

mod mirror;
mod server;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use edgebar_config::{log_dir, resolve_data_dir, Config, Trigger};
use edgebar_ipc::{IpcCommand, IpcResponse};
use edgebar_platform_win32::{enable_dpi_awareness, HostWindow, NativePlatform, Win32Error, WindowId};
use state::{AppState, HostFactory, Hub};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Events that the daemon event loop processes.
pub(crate) enum DaemonEvent {
    /// An IPC command from a client.
    IpcCommand {
        cmd: IpcCommand,
        responder: oneshot::Sender<IpcResponse>,
    },
    /// Animation tick (16ms intervals).
    AnimationTick,
    /// Re-read the monitor list.
    DisplayPoll,
    /// Sample the foreground window.
    ForegroundPoll,
    /// Shutdown signal.
    Shutdown,
}

/// Animation tick interval in milliseconds (~60 FPS).
const ANIMATION_TICK_MS: u64 = 16;

const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const FOREGROUND_POLL_INTERVAL: Duration = Duration::from_secs(1);

const GUARDIAN_BIN: &str = "edgebar-guardian";

#[derive(Parser)]
#[command(name = "edgebar")]
#[command(author, version, about = "Edgebar sidebar host")]
struct Args {
    /// Data directory holding config.json, scripts and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(windows)]
fn host_factory() -> HostFactory {
    use edgebar_platform_win32::NativeHostWindow;

    Box::new(|id: WindowId| -> Result<Box<dyn HostWindow>, Win32Error> {
        Ok(Box::new(NativeHostWindow::attach(id)?))
    })
}

#[cfg(not(windows))]
fn host_factory() -> HostFactory {
    use edgebar_platform_win32::HeadlessWindow;

    Box::new(|id: WindowId| -> Result<Box<dyn HostWindow>, Win32Error> {
        warn!("Native windows are not supported here; window {} is mirrored headless", id);
        Ok(Box::new(HeadlessWindow::new()))
    })
}

/// Launch the guardian next to our own executable.
///
/// The guardian outlives us, so it is started in its own process group.
fn spawn_guardian(data_dir: &Path) -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    let guardian = exe.with_file_name(format!("{}{}", GUARDIAN_BIN, std::env::consts::EXE_SUFFIX));

    let mut command = std::process::Command::new(&guardian);
    command
        .arg("--pid")
        .arg(std::process::id().to_string())
        .arg("--data-dir")
        .arg(data_dir);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command
        .spawn()
        .with_context(|| format!("Failed to launch {}", guardian.display()))?;
    Ok(child.id())
}

/// Spawn a task that sends an event on every interval tick.
fn spawn_ticker(
    tx: mpsc::Sender<DaemonEvent>,
    period: Duration,
    event: fn() -> DaemonEvent,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(event()).await.is_err() {
                break; // Channel closed
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = resolve_data_dir(args.data_dir);

    // Load configuration first (needed for log level)
    let config = Config::load(&data_dir).unwrap_or_else(|e| {
        // Can't use tracing yet, fall back to eprintln
        eprintln!("Failed to load configuration: {}. Using defaults.", e);
        Config::default()
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(config.behavior.log_level()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    enable_dpi_awareness();

    info!("Edgebar daemon starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", data_dir.display());

    if server::check_already_running().await {
        error!("Another edgebar instance is already running");
        return Ok(());
    }

    if let Err(e) = std::fs::create_dir_all(log_dir(&data_dir)) {
        warn!("Failed to create log directory: {}", e);
    }

    match spawn_guardian(&data_dir) {
        Ok(pid) => info!(pid, "Guardian started"),
        Err(e) => warn!("{:#}", e),
    }

    // Startup tasks are fire-and-forget.
    {
        let tasks = config.automatic.clone();
        let dir = data_dir.clone();
        tokio::spawn(async move {
            edgebar_automation::run_trigger(&tasks, Trigger::Startup, &dir).await;
        });
    }

    let hub = Hub::new();
    let mut state = AppState::new(
        config,
        data_dir,
        NativePlatform,
        std::process::id(),
        host_factory(),
        hub.clone(),
    );

    let (event_tx, mut event_rx) = mpsc::channel::<DaemonEvent>(100);

    let tickers = [
        spawn_ticker(event_tx.clone(), Duration::from_millis(ANIMATION_TICK_MS), || DaemonEvent::AnimationTick),
        spawn_ticker(event_tx.clone(), DISPLAY_POLL_INTERVAL, || DaemonEvent::DisplayPoll),
        spawn_ticker(event_tx.clone(), FOREGROUND_POLL_INTERVAL, || DaemonEvent::ForegroundPoll),
    ];

    // Spawn IPC server
    let ipc_tx = event_tx.clone();
    let ipc_hub = hub.clone();
    let ipc_server = tokio::spawn(async move {
        server::run_ipc_server(ipc_tx, ipc_hub).await;
    });

    // Install Ctrl+C handler so terminal kill triggers graceful shutdown
    {
        let shutdown_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Ctrl+C received, initiating shutdown...");
                let _ = shutdown_tx.send(DaemonEvent::Shutdown).await;
            }
        });
    }
    drop(event_tx);

    info!("Ready. Waiting for the renderer to attach.");

    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_secs_f64() * 1000.0;

    // Main event loop
    while let Some(event) = event_rx.recv().await {
        match event {
            DaemonEvent::IpcCommand { cmd, responder } => {
                let response = state.handle_command(cmd, now_ms());
                if responder.send(response).is_err() {
                    debug!("Client disconnected before receiving IPC response");
                }
            }
            DaemonEvent::AnimationTick => state.tick(now_ms()),
            DaemonEvent::DisplayPoll => state.refresh_displays(),
            DaemonEvent::ForegroundPoll => state.poll_foreground(),
            DaemonEvent::Shutdown => {
                info!("Shutting down...");
                break;
            }
        }
    }

    for ticker in tickers {
        ticker.abort();
    }
    ipc_server.abort();
    server::cleanup();

    info!("Edgebar daemon stopped");
    Ok(())
}
