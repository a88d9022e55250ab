//! Edgebar Platform Win32
//!
//! OS-facing side of edgebar.
//!
//! This crate handles:
//! - Top-level window enumeration and keyword filtering
//! - Foreground window tracking with a bounded, blacklisted history
//! - Graceful window close and forceful process termination
//! - Process liveness probing (used by the guardian)
//! - Monitor enumeration
//! - The host window primitive the window mirror drives
//!
//! Everything goes through the [`PlatformQuery`] and [`HostWindow`] traits so
//! the rest of the workspace can be tested with in-memory implementations.

pub mod discovery;
mod headless;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::{enable_dpi_awareness, NativeHostWindow, NativePlatform};

#[cfg(not(windows))]
mod fallback;
#[cfg(not(windows))]
pub use fallback::{enable_dpi_awareness, NativePlatform};

pub use discovery::{filter_by_keywords, ForegroundHistory, WindowDiscovery};
pub use edgebar_core_motion::{DisplayInfo, Rect};
pub use headless::HeadlessWindow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Native window handle (HWND on Windows) as an integer.
pub type WindowId = u64;

/// Errors that can occur during platform operations.
#[derive(Debug, Error)]
pub enum Win32Error {
    #[error("Failed to enumerate windows: {0}")]
    EnumerationFailed(String),

    #[error("Failed to enumerate monitors: {0}")]
    MonitorQueryFailed(String),

    #[error("Failed to read cursor position: {0}")]
    CursorQueryFailed(String),

    #[error("Failed to set window position: {0}")]
    SetPositionFailed(String),

    #[error("Failed to change window style: {0}")]
    StyleChangeFailed(String),

    #[error("Failed to close window {0}: {1}")]
    CloseFailed(WindowId, String),

    #[error("Failed to terminate process {0}: {1}")]
    TerminateFailed(u32, String),

    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),
}

/// A top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// The window handle as u64.
    pub hwnd: WindowId,
    /// Window title.
    pub title: String,
    /// Owning process ID.
    pub process_id: u32,
    /// Executable file name of the owning process, empty if unknown.
    pub executable: String,
}

/// Read-only and process-control queries against the OS.
pub trait PlatformQuery {
    /// All visible top-level windows with a title.
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>, Win32Error>;

    /// The window that currently has focus.
    fn foreground_window(&self) -> Result<Option<WindowInfo>, Win32Error>;

    /// Ask a window to close (WM_CLOSE). The owner may refuse.
    fn close_window(&self, hwnd: WindowId) -> Result<(), Win32Error>;

    /// Forcefully terminate a process.
    fn terminate_process(&self, pid: u32) -> Result<(), Win32Error>;

    /// Whether a process with this id is still running. Does not signal it.
    fn is_process_alive(&self, pid: u32) -> bool;

    /// Connected monitors with their work areas.
    fn enumerate_displays(&self) -> Result<Vec<DisplayInfo>, Win32Error>;

    /// Cursor position in screen pixels.
    fn cursor_position(&self) -> Result<(f64, f64), Win32Error>;
}

/// The OS window hosting the sidebar.
pub trait HostWindow: Send {
    fn set_bounds(&mut self, bounds: Rect) -> Result<(), Win32Error>;

    /// Show without activating.
    fn show(&mut self) -> Result<(), Win32Error>;

    fn hide(&mut self) -> Result<(), Win32Error>;

    fn set_always_on_top(&mut self, on_top: bool) -> Result<(), Win32Error>;

    /// Make the window click-through. With `forward`, the caller keeps
    /// tracking the cursor itself and lifts click-through when it comes back
    /// over the interactive region.
    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<(), Win32Error>;

    /// Whether the underlying window is gone.
    fn is_destroyed(&self) -> bool;
}
