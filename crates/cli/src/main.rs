//! Edgebar CLI
//!
//! Command-line interface for controlling the edgebar daemon.
//!
//! Commands are sent to the daemon via IPC (named pipe on Windows, Unix
//! socket elsewhere). Every response line is printed as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use edgebar_config::Transforms;
use edgebar_ipc::{decode_response, encode_line, IpcCommand, IpcResponse, PointerPhase};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "edgebar-cli")]
#[command(author, version, about = "Control the edgebar sidebar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a native window as the sidebar host
    Attach {
        /// Window handle (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_window_id)]
        window_id: u64,
    },
    /// Forward a synthetic pointer event
    Pointer {
        #[arg(value_enum)]
        phase: Phase,
        x: f64,
        y: f64,
        /// Event timestamp in milliseconds
        #[arg(short, long, default_value = "0")]
        time_ms: f64,
        /// Treat the event as starting on a widget control
        #[arg(long)]
        on_widget_control: bool,
    },
    /// Report a cursor position and print whether it is interactive
    Hover { x: f64, y: f64 },
    /// Resize the host window
    Resize {
        width: i32,
        height: i32,
        /// Top edge; derived from the configuration when omitted
        #[arg(long)]
        y: Option<i32>,
        /// Jump straight to the new size
        #[arg(long)]
        no_animate: bool,
    },
    /// Expand the panel
    Expand,
    /// Collapse the panel
    Collapse,
    /// Toggle click-through on the host window
    ClickThrough {
        #[arg(action = clap::ArgAction::Set)]
        ignore: bool,
        /// Keep forwarding mouse moves while ignoring clicks
        #[arg(long)]
        forward: bool,
    },
    /// Preview a transforms block without saving it
    Preview {
        /// JSON object, e.g. '{"size":120,"panel":{"width":500}}'
        transforms: String,
    },
    /// Reload configuration from file
    Reload,
    /// Stream configuration changes until interrupted
    Subscribe {
        /// Also stream every geometry frame
        #[arg(long)]
        frames: bool,
    },
    /// Query sidebar state
    State,
    /// List windows whose title contains any keyword
    FindWindows {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Ask the most recently used window to close
    CloseLast,
    /// Terminate conflicting software
    KillConflicting {
        /// Title keywords; the configured list when omitted
        keywords: Vec<String>,
    },
    /// Replace the foreground history blacklist
    Blacklist { entries: Vec<String> },
    /// Stop the daemon
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum Phase {
    Down,
    Move,
    Up,
    Cancel,
}

impl From<Phase> for PointerPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Down => PointerPhase::Down,
            Phase::Move => PointerPhase::Move,
            Phase::Up => PointerPhase::Up,
            Phase::Cancel => PointerPhase::Cancel,
        }
    }
}

fn parse_window_id(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid window handle '{}': {}", s, e))
}

impl Commands {
    fn into_ipc(self) -> Result<IpcCommand> {
        Ok(match self {
            Commands::Attach { window_id } => IpcCommand::Attach { window_id },
            Commands::Pointer {
                phase,
                x,
                y,
                time_ms,
                on_widget_control,
            } => IpcCommand::Pointer {
                phase: phase.into(),
                x,
                y,
                time_ms,
                on_widget_control,
            },
            Commands::Hover { x, y } => IpcCommand::Hover { x, y },
            Commands::Resize {
                width,
                height,
                y,
                no_animate,
            } => IpcCommand::RequestResize {
                width,
                height,
                y,
                animate: !no_animate,
            },
            Commands::Expand => IpcCommand::RequestExpand,
            Commands::Collapse => IpcCommand::RequestCollapse,
            Commands::ClickThrough { ignore, forward } => IpcCommand::SetIgnoreMouseEvents { ignore, forward },
            Commands::Preview { transforms } => {
                let transforms: Transforms =
                    serde_json::from_str(&transforms).context("Failed to parse transforms JSON")?;
                IpcCommand::PreviewConfig { transforms }
            }
            Commands::Reload => IpcCommand::ReloadConfig,
            Commands::Subscribe { frames } => IpcCommand::Subscribe { frames },
            Commands::State => IpcCommand::QueryState,
            Commands::FindWindows { keywords } => IpcCommand::FindWindows { keywords },
            Commands::CloseLast => IpcCommand::CloseLastWindow,
            Commands::KillConflicting { keywords } => IpcCommand::KillConflicting {
                keywords: (!keywords.is_empty()).then_some(keywords),
            },
            Commands::Blacklist { entries } => IpcCommand::SetBlacklist { entries },
            Commands::Stop => IpcCommand::Stop,
        })
    }
}

#[cfg(windows)]
async fn connect() -> Result<tokio::net::windows::named_pipe::NamedPipeClient> {
    use std::time::Duration;
    use tokio::net::windows::named_pipe::ClientOptions;

    const ERROR_PIPE_BUSY: i32 = 231;
    const CONNECT_ATTEMPTS: u32 = 20;

    let mut attempt = 0;
    loop {
        match ClientOptions::new().open(edgebar_ipc::PIPE_NAME) {
            Ok(client) => return Ok(client),
            Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY) && attempt < CONNECT_ATTEMPTS => {
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(e) => return Err(e).context("Failed to connect to daemon. Is edgebar running?"),
        }
    }
}

#[cfg(unix)]
async fn connect() -> Result<tokio::net::UnixStream> {
    tokio::net::UnixStream::connect(edgebar_ipc::socket_path())
        .await
        .context("Failed to connect to daemon. Is edgebar running?")
}

/// Send one command and print responses until the daemon closes the stream
/// or, for anything but `subscribe`, after the first response.
async fn run<S>(stream: S, cmd: IpcCommand) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let streaming = matches!(cmd, IpcCommand::Subscribe { .. });
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    writer.write_all(encode_line(&cmd)?.as_bytes()).await?;
    writer.flush().await?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            if streaming {
                return Ok(());
            }
            bail!("Daemon closed the connection without responding");
        }
        let response = decode_response(&line)?;
        print_response(&response)?;
        if let IpcResponse::Error { message } = response {
            bail!("{}", message);
        }
        if !streaming {
            return Ok(());
        }
    }
}

fn print_response(response: &IpcResponse) -> Result<()> {
    match response {
        IpcResponse::Ok => println!("OK"),
        IpcResponse::Error { .. } => {}
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.command.into_ipc()?;
    let stream = connect().await?;
    run(stream, cmd).await
}
