//! Edgebar IPC Protocol
//!
//! Shared types for communication between the host daemon and its clients
//! (renderer, widgets, settings UI, CLI). One JSON command per line, one JSON
//! response per line. Transport is a named pipe on Windows and a Unix domain
//! socket elsewhere.

use edgebar_config::Transforms;
use edgebar_core_motion::{EnginePhase, Frame, GeometryConfig, PanelBox, PointerOutcome, Rect};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Named pipe path for IPC communication.
pub const PIPE_NAME: &str = r"\\.\pipe\edgebar";

/// Socket file name (in the temp directory) on non-Windows platforms.
pub const SOCKET_NAME: &str = "edgebar.sock";

/// Upper bound for a single message line.
pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024;

/// Unix domain socket path.
pub fn socket_path() -> PathBuf {
    std::env::temp_dir().join(SOCKET_NAME)
}

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("Message exceeds {MAX_IPC_MESSAGE_SIZE} bytes")]
    TooLarge,

    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Phase of a forwarded pointer or touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

fn default_true() -> bool {
    true
}

/// Commands that can be sent to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    /// Register the native handle of the renderer's window.
    Attach { window_id: u64 },

    /// Forward a pointer or touch event (screen coordinates).
    Pointer {
        phase: PointerPhase,
        x: f64,
        y: f64,
        /// Renderer event timestamp in milliseconds.
        time_ms: f64,
        /// Whether the event started on a widget's own control.
        #[serde(default)]
        on_widget_control: bool,
    },

    /// Report the cursor position so click-through can be toggled.
    Hover { x: f64, y: f64 },

    /// Resize the host window, immediately or animated.
    RequestResize {
        width: i32,
        height: i32,
        /// Explicit top edge; derived from the configuration when absent.
        #[serde(default)]
        y: Option<i32>,
        #[serde(default = "default_true")]
        animate: bool,
    },

    /// Expand the panel.
    RequestExpand,
    /// Collapse the panel.
    RequestCollapse,

    /// Make the host window click-through.
    SetIgnoreMouseEvents {
        ignore: bool,
        #[serde(default)]
        forward: bool,
    },

    /// Apply an unsaved `transforms` block (settings preview).
    PreviewConfig { transforms: Transforms },

    /// Reload configuration from file.
    ReloadConfig,

    /// Keep the connection open and stream configuration changes
    /// (and frames, if requested).
    Subscribe {
        #[serde(default)]
        frames: bool,
    },

    /// Query the sidebar state.
    QueryState,

    /// List windows whose title matches any keyword.
    FindWindows { keywords: Vec<String> },

    /// Ask the most recently used window to close.
    CloseLastWindow,

    /// Terminate software known to conflict with the sidebar.
    KillConflicting {
        /// Title keywords; the configured list when absent.
        #[serde(default)]
        keywords: Option<Vec<String>>,
    },

    /// Replace the foreground history blacklist.
    SetBlacklist { entries: Vec<String> },

    /// Stop the daemon.
    Stop,
}

/// A window as reported over IPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub hwnd: u64,
    pub title: String,
    pub process_id: u32,
    pub executable: String,
}

/// Responses from the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed with an error.
    Error {
        /// Error message describing what went wrong.
        message: String,
    },
    /// Result of a forwarded pointer event.
    Pointer { outcome: PointerOutcome },
    /// Result of a hover report.
    Hover {
        /// Whether the point is over the interactive region.
        interactive: bool,
    },
    /// Sidebar state query response.
    State {
        progress: f64,
        phase: EnginePhase,
        window: Rect,
        panel: PanelBox,
        interactive_region: Rect,
        work_area: Rect,
        /// Whether a renderer window is attached.
        attached: bool,
    },
    /// Matching windows.
    Windows { windows: Vec<WindowSummary> },
    /// Window a close request was sent to, if any.
    Closed { window: Option<WindowSummary> },
    /// Processes that were terminated.
    Killed { pids: Vec<u32> },
    /// Pushed to subscribers whenever the geometry configuration changes.
    ConfigChanged {
        transforms: Transforms,
        geometry: GeometryConfig,
        animation_speed: f64,
    },
    /// Pushed to frame subscribers for every applied frame.
    Frame { frame: Frame },
}

impl IpcResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Serialize a message as one protocol line (with trailing newline).
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, IpcError> {
    let mut line = serde_json::to_string(message)?;
    if line.len() >= MAX_IPC_MESSAGE_SIZE {
        return Err(IpcError::TooLarge);
    }
    line.push('\n');
    Ok(line)
}

fn check_size(line: &str) -> Result<&str, IpcError> {
    if line.len() > MAX_IPC_MESSAGE_SIZE {
        return Err(IpcError::TooLarge);
    }
    Ok(line.trim())
}

/// Parse one command line.
pub fn decode_command(line: &str) -> Result<IpcCommand, IpcError> {
    Ok(serde_json::from_str(check_size(line)?)?)
}

/// Parse one response line.
pub fn decode_response(line: &str) -> Result<IpcResponse, IpcError> {
    Ok(serde_json::from_str(check_size(line)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgebar_core_motion::{map_progress, Decision};

    #[test]
    fn test_command_serialization() {
        let cmd = IpcCommand::RequestExpand;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("request_expand"));

        let cmd2: IpcCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, cmd2);
    }

    #[test]
    fn test_pointer_command_defaults() {
        let cmd = decode_command(r#"{"type":"pointer","phase":"down","x":3,"y":400,"time_ms":12.5}"#).unwrap();
        assert_eq!(
            cmd,
            IpcCommand::Pointer {
                phase: PointerPhase::Down,
                x: 3.0,
                y: 400.0,
                time_ms: 12.5,
                on_widget_control: false,
            }
        );
    }

    #[test]
    fn test_resize_command_defaults() {
        let cmd = decode_command(r#"{"type":"request_resize","width":600,"height":500}"#).unwrap();
        assert_eq!(
            cmd,
            IpcCommand::RequestResize {
                width: 600,
                height: 500,
                y: None,
                animate: true,
            }
        );
    }

    #[test]
    fn test_optional_command_fields() {
        assert_eq!(
            decode_command(r#"{"type":"kill_conflicting"}"#).unwrap(),
            IpcCommand::KillConflicting { keywords: None }
        );
        assert_eq!(
            decode_command(r#"{"type":"subscribe"}"#).unwrap(),
            IpcCommand::Subscribe { frames: false }
        );
        assert_eq!(
            decode_command(r#"{"type":"set_ignore_mouse_events","ignore":true}"#).unwrap(),
            IpcCommand::SetIgnoreMouseEvents {
                ignore: true,
                forward: false
            }
        );
    }

    #[test]
    fn test_preview_config_is_lenient() {
        let cmd = decode_command(r#"{"type":"preview_config","transforms":{"size":"150","panel":5}}"#).unwrap();
        match cmd {
            IpcCommand::PreviewConfig { transforms } => {
                assert_eq!(transforms.scale(), 1.5);
                assert_eq!(transforms.panel.width(), 450.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_response_serialization() {
        let resp = IpcResponse::Ok;
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("ok"));

        let resp2: IpcResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, resp2);
    }

    #[test]
    fn test_error_response() {
        let resp = IpcResponse::error("Something went wrong");
        if let IpcResponse::Error { message } = resp {
            assert_eq!(message, "Something went wrong");
        } else {
            panic!("Expected Error response");
        }
    }

    #[test]
    fn test_pointer_response_shape() {
        let resp = IpcResponse::Pointer {
            outcome: PointerOutcome::Settling {
                decision: Decision::Expand,
            },
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "pointer");
        assert_eq!(value["outcome"]["kind"], "settling");
        assert_eq!(value["outcome"]["decision"], "expand");
    }

    #[test]
    fn test_state_response_roundtrip() {
        let geometry = map_progress(1.0, &GeometryConfig::default(), Rect::new(0, 0, 1920, 1040));
        let resp = IpcResponse::State {
            progress: 1.0,
            phase: EnginePhase::Expanded,
            window: geometry.window,
            panel: geometry.panel,
            interactive_region: Rect::new(0, 320, 462, 400),
            work_area: Rect::new(0, 0, 1920, 1040),
            attached: true,
        };
        let line = encode_line(&resp).unwrap();
        assert!(line.ends_with('\n'));
        assert!(line.contains("\"phase\":\"expanded\""));
        assert_eq!(decode_response(&line).unwrap(), resp);
    }

    #[test]
    fn test_line_delimited_protocol() {
        let cmd = IpcCommand::FindWindows {
            keywords: vec!["steam".to_string()],
        };
        let wire_format = encode_line(&cmd).unwrap();
        assert_eq!(wire_format.matches('\n').count(), 1);
        assert_eq!(decode_command(&wire_format).unwrap(), cmd);
    }

    #[test]
    fn test_oversized_message_rejected() {
        let line = format!(
            r#"{{"type":"set_blacklist","entries":["{}"]}}"#,
            "x".repeat(MAX_IPC_MESSAGE_SIZE)
        );
        assert!(matches!(decode_command(&line), Err(IpcError::TooLarge)));

        let cmd = IpcCommand::SetBlacklist {
            entries: vec!["x".repeat(MAX_IPC_MESSAGE_SIZE)],
        };
        assert!(matches!(encode_line(&cmd), Err(IpcError::TooLarge)));
    }

    #[test]
    fn test_invalid_json_handling() {
        assert!(decode_command("not valid json").is_err());
        assert!(decode_command("{\"type\": \"unknown_command\"}").is_err());
        assert!(decode_response("{\"status\": \"invalid\"}").is_err());
    }

    #[test]
    fn test_pipe_name_format() {
        assert!(PIPE_NAME.starts_with(r"\\.\pipe\"));
        assert_eq!(PIPE_NAME, r"\\.\pipe\edgebar");
        assert!(socket_path().ends_with(SOCKET_NAME));
    }
}
