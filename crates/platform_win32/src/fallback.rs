//! Non-Windows [`PlatformQuery`].
//!
//! Process liveness and termination use POSIX signals; window and monitor
//! queries are unsupported and callers degrade to empty results.

use crate::{DisplayInfo, PlatformQuery, Win32Error, WindowId, WindowInfo};

/// No DPI model to opt into outside Windows.
pub fn enable_dpi_awareness() {}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

impl PlatformQuery for NativePlatform {
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>, Win32Error> {
        Err(Win32Error::Unsupported("window enumeration"))
    }

    fn foreground_window(&self) -> Result<Option<WindowInfo>, Win32Error> {
        Err(Win32Error::Unsupported("foreground window"))
    }

    fn close_window(&self, hwnd: WindowId) -> Result<(), Win32Error> {
        Err(Win32Error::CloseFailed(hwnd, "unsupported on this platform".to_string()))
    }

    #[cfg(unix)]
    fn terminate_process(&self, pid: u32) -> Result<(), Win32Error> {
        let pid = libc::pid_t::try_from(pid)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| Win32Error::TerminateFailed(pid, "pid out of range".to_string()))?;
        if unsafe { libc::kill(pid, libc::SIGKILL) } == 0 {
            Ok(())
        } else {
            Err(Win32Error::TerminateFailed(
                pid as u32,
                std::io::Error::last_os_error().to_string(),
            ))
        }
    }

    #[cfg(not(unix))]
    fn terminate_process(&self, _pid: u32) -> Result<(), Win32Error> {
        Err(Win32Error::Unsupported("process termination"))
    }

    #[cfg(unix)]
    fn is_process_alive(&self, pid: u32) -> bool {
        let Ok(pid) = libc::pid_t::try_from(pid) else {
            return false;
        };
        if pid <= 0 {
            return false;
        }
        // Signal 0 probes for existence without delivering anything.
        if unsafe { libc::kill(pid, 0) } == 0 {
            return true;
        }
        std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }

    #[cfg(not(unix))]
    fn is_process_alive(&self, _pid: u32) -> bool {
        false
    }

    fn enumerate_displays(&self) -> Result<Vec<DisplayInfo>, Win32Error> {
        Err(Win32Error::Unsupported("monitor enumeration"))
    }

    fn cursor_position(&self) -> Result<(f64, f64), Win32Error> {
        Err(Win32Error::Unsupported("cursor position"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_is_alive() {
        assert!(NativePlatform.is_process_alive(std::process::id()));
    }

    #[test]
    fn test_exited_process_is_not_alive() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(!NativePlatform.is_process_alive(pid));
    }

    #[test]
    fn test_pid_zero_is_not_alive() {
        assert!(!NativePlatform.is_process_alive(0));
    }

    #[test]
    fn test_window_queries_unsupported() {
        assert!(NativePlatform.enumerate_windows().is_err());
        assert!(NativePlatform.enumerate_displays().is_err());
        assert!(NativePlatform.cursor_position().is_err());
    }

    #[test]
    fn test_terminate_rejects_process_group_pids() {
        assert!(NativePlatform.terminate_process(0).is_err());
        assert!(NativePlatform.terminate_process(u32::MAX).is_err());
    }
}
