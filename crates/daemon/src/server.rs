//! IPC server.
//!
//! Accepts connections on the named pipe (Windows) or Unix socket and feeds
//! every command line into the daemon event loop. A connection may carry any
//! number of commands; `subscribe` turns it into a push stream.

use crate::state::Hub;
use crate::DaemonEvent;
use anyhow::Result;
use edgebar_ipc::{decode_command, encode_line, IpcCommand, IpcResponse, MAX_IPC_MESSAGE_SIZE};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// IPC read timeout - clients must send their first command within this period.
const IPC_READ_TIMEOUT: Duration = Duration::from_secs(5);

const SERIALIZATION_FAILURE: &str = "{\"status\":\"error\",\"message\":\"Internal serialization error\"}\n";

#[cfg(windows)]
pub async fn run_ipc_server(event_tx: mpsc::Sender<DaemonEvent>, hub: Hub) {
    use edgebar_ipc::PIPE_NAME;
    use tokio::net::windows::named_pipe::{PipeMode, ServerOptions};
    use tracing::error;

    let mut is_first_instance = true;

    loop {
        let server = match ServerOptions::new()
            .first_pipe_instance(is_first_instance)
            .pipe_mode(PipeMode::Byte)
            .create(PIPE_NAME)
        {
            Ok(s) => {
                is_first_instance = false;
                s
            }
            Err(e) => {
                error!("Failed to create named pipe server: {}", e);
                if is_first_instance {
                    error!("Is another edgebar daemon already running?");
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        debug!("Waiting for client connection on {}", PIPE_NAME);

        if let Err(e) = server.connect().await {
            error!("Failed to accept client connection: {}", e);
            continue;
        }

        let event_tx = event_tx.clone();
        let hub = hub.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(server, event_tx, hub).await {
                warn!("Client handler error: {}", e);
            }
        });
    }
}

#[cfg(unix)]
pub async fn run_ipc_server(event_tx: mpsc::Sender<DaemonEvent>, hub: Hub) {
    use tokio::net::UnixListener;
    use tracing::error;

    let path = edgebar_ipc::socket_path();
    // A stale socket from a crashed daemon blocks bind.
    let _ = std::fs::remove_file(&path);
    let listener = match UnixListener::bind(&path) {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", path.display(), e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let event_tx = event_tx.clone();
                let hub = hub.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, event_tx, hub).await {
                        warn!("Client handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept client connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

/// Remove the socket file on shutdown.
pub fn cleanup() {
    #[cfg(unix)]
    {
        let _ = std::fs::remove_file(edgebar_ipc::socket_path());
    }
}

/// Check if another daemon instance is already listening.
pub async fn check_already_running() -> bool {
    #[cfg(windows)]
    {
        tokio::net::windows::named_pipe::ClientOptions::new()
            .open(edgebar_ipc::PIPE_NAME)
            .is_ok()
    }
    #[cfg(unix)]
    {
        tokio::net::UnixStream::connect(edgebar_ipc::socket_path()).await.is_ok()
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &IpcResponse) -> std::io::Result<()> {
    let line = match encode_line(response) {
        Ok(line) => line,
        Err(e) => {
            warn!("Failed to serialize IPC response: {}", e);
            SERIALIZATION_FAILURE.to_string()
        }
    };
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Send a command to the event loop and wait for its response.
async fn dispatch(event_tx: &mpsc::Sender<DaemonEvent>, cmd: IpcCommand) -> IpcResponse {
    let (resp_tx, resp_rx) = oneshot::channel();
    if event_tx
        .send(DaemonEvent::IpcCommand {
            cmd,
            responder: resp_tx,
        })
        .await
        .is_err()
    {
        return IpcResponse::error("Daemon is shutting down");
    }
    match resp_rx.await {
        Ok(resp) => resp,
        Err(_) => IpcResponse::error("Failed to get response from daemon"),
    }
}

async fn recv_optional(rx: &mut Option<broadcast::Receiver<IpcResponse>>) -> Result<IpcResponse, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handle a single client connection.
pub async fn handle_client<S>(stream: S, event_tx: mpsc::Sender<DaemonEvent>, hub: Hub) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut first = true;

    loop {
        let mut line = String::new();
        let mut limited = (&mut reader).take(MAX_IPC_MESSAGE_SIZE as u64 + 1);
        let read = limited.read_line(&mut line);
        let bytes_read = if first {
            match tokio::time::timeout(IPC_READ_TIMEOUT, read).await {
                Ok(result) => result?,
                // Client did not send in time, silently close.
                Err(_) => return Ok(()),
            }
        } else {
            read.await?
        };
        first = false;
        if bytes_read == 0 {
            return Ok(());
        }
        if line.len() > MAX_IPC_MESSAGE_SIZE {
            write_response(&mut writer, &IpcResponse::error("Message too large")).await?;
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match decode_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                write_response(&mut writer, &IpcResponse::error(format!("Invalid command: {}", e))).await?;
                continue;
            }
        };
        debug!(?cmd, "Received command");

        match cmd {
            IpcCommand::Subscribe { frames } => {
                // Subscribe before asking for the snapshot so no change is missed.
                let mut config_rx = hub.subscribe_config();
                let mut frames_rx = frames.then(|| hub.subscribe_frames());
                let snapshot = dispatch(&event_tx, IpcCommand::Subscribe { frames }).await;
                write_response(&mut writer, &snapshot).await?;

                loop {
                    let pushed = tokio::select! {
                        r = config_rx.recv() => r,
                        r = recv_optional(&mut frames_rx) => r,
                    };
                    match pushed {
                        Ok(response) => write_response(&mut writer, &response).await?,
                        Err(RecvError::Lagged(skipped)) => debug!(skipped, "Subscriber lagging"),
                        Err(RecvError::Closed) => return Ok(()),
                    }
                }
            }
            IpcCommand::Stop => {
                let response = dispatch(&event_tx, IpcCommand::Stop).await;
                write_response(&mut writer, &response).await?;
                let _ = event_tx.send(DaemonEvent::Shutdown).await;
                return Ok(());
            }
            cmd => {
                let response = dispatch(&event_tx, cmd).await;
                write_response(&mut writer, &response).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgebar_ipc::decode_response;
    use tokio::io::duplex;

    /// Event loop stand-in that answers every command with `Ok`, or the
    /// current config snapshot for `subscribe`.
    fn fake_loop(mut rx: mpsc::Receiver<DaemonEvent>) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(event) = rx.recv().await {
                match event {
                    DaemonEvent::IpcCommand { cmd, responder } => {
                        seen.push(format!("{:?}", cmd));
                        let response = match cmd {
                            IpcCommand::Subscribe { .. } => IpcResponse::Hover { interactive: false },
                            _ => IpcResponse::Ok,
                        };
                        let _ = responder.send(response);
                    }
                    DaemonEvent::Shutdown => {
                        seen.push("shutdown".to_string());
                        break;
                    }
                    _ => {}
                }
            }
            seen
        })
    }

    async fn read_response<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> IpcResponse {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        decode_response(&line).unwrap()
    }

    #[tokio::test]
    async fn test_multiple_commands_per_connection() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let handle = fake_loop(event_rx);
        let (client, server) = duplex(4096);
        tokio::spawn(handle_client(server, event_tx, Hub::new()));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);

        client_write.write_all(b"{\"type\":\"request_expand\"}\n").await.unwrap();
        assert_eq!(read_response(&mut client_read).await, IpcResponse::Ok);
        client_write.write_all(b"not json\n").await.unwrap();
        assert!(matches!(read_response(&mut client_read).await, IpcResponse::Error { .. }));
        client_write.write_all(b"{\"type\":\"stop\"}\n").await.unwrap();
        assert_eq!(read_response(&mut client_read).await, IpcResponse::Ok);

        let seen = handle.await.unwrap();
        assert_eq!(seen, vec!["RequestExpand".to_string(), "Stop".to_string(), "shutdown".to_string()]);
    }

    #[tokio::test]
    async fn test_subscribe_streams_pushes() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let _loop = fake_loop(event_rx);
        let hub = Hub::new();
        let (client, server) = duplex(4096);
        tokio::spawn(handle_client(server, event_tx, hub.clone()));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);
        client_write.write_all(b"{\"type\":\"subscribe\"}\n").await.unwrap();
        assert_eq!(
            read_response(&mut client_read).await,
            IpcResponse::Hover { interactive: false }
        );

        hub.publish_config(IpcResponse::Ok);
        assert_eq!(read_response(&mut client_read).await, IpcResponse::Ok);
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected() {
        let (event_tx, event_rx) = mpsc::channel(8);
        let _loop = fake_loop(event_rx);
        let (client, server) = duplex(MAX_IPC_MESSAGE_SIZE * 2);
        let handler = tokio::spawn(handle_client(server, event_tx, Hub::new()));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);
        let mut oversized = vec![b'x'; MAX_IPC_MESSAGE_SIZE + 10];
        oversized.push(b'\n');
        client_write.write_all(&oversized).await.unwrap();

        assert_eq!(
            read_response(&mut client_read).await,
            IpcResponse::error("Message too large")
        );
        assert!(handler.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_client_times_out() {
        let (event_tx, _event_rx) = mpsc::channel(8);
        let (_client, server) = duplex(4096);
        let result = handle_client(server, event_tx, Hub::new()).await;
        assert!(result.is_ok());
    }
}
