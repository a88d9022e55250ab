//! Win32 implementations of [`PlatformQuery`] and [`HostWindow`].

use crate::{DisplayInfo, HostWindow, PlatformQuery, Rect, Win32Error, WindowId, WindowInfo};
use std::ffi::c_void;
use std::mem;
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, E_ACCESSDENIED, HWND, LPARAM, POINT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW, MONITORINFOF_PRIMARY,
};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, QueryFullProcessImageNameW, TerminateProcess, PROCESS_NAME_FORMAT,
    PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
};
use windows::Win32::UI::HiDpi::{SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetCursorPos, GetForegroundWindow, GetWindowLongPtrW, GetWindowTextW, GetWindowThreadProcessId, IsWindow,
    IsWindowVisible, PostMessageW, SetWindowLongPtrW, SetWindowPos, ShowWindow, GWL_EXSTYLE, HWND_NOTOPMOST,
    HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE, SW_SHOWNA, WM_CLOSE,
    WS_EX_LAYERED, WS_EX_TRANSPARENT,
};

/// Exit code reported by GetExitCodeProcess for running processes.
const STILL_ACTIVE: u32 = 259;

fn to_hwnd(id: WindowId) -> HWND {
    HWND(id as usize as *mut c_void)
}

fn to_id(hwnd: HWND) -> WindowId {
    hwnd.0 as usize as WindowId
}

/// Opt into per-monitor DPI awareness so bounds are physical pixels.
pub fn enable_dpi_awareness() {
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        tracing::debug!("DPI awareness not changed: {}", e);
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
    handles.push(hwnd);
    TRUE
}

unsafe extern "system" fn collect_monitor(monitor: HMONITOR, _hdc: HDC, _clip: *mut RECT, lparam: LPARAM) -> BOOL {
    let displays = unsafe { &mut *(lparam.0 as *mut Vec<DisplayInfo>) };
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;
    if unsafe { GetMonitorInfoW(monitor, &mut info as *mut MONITORINFOEXW as *mut MONITORINFO) }.as_bool() {
        let rc = info.monitorInfo.rcMonitor;
        let wa = info.monitorInfo.rcWork;
        let name_len = info.szDevice.iter().position(|c| *c == 0).unwrap_or(info.szDevice.len());
        displays.push(DisplayInfo {
            id: monitor.0 as usize as u64,
            bounds: Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top),
            work_area: Rect::new(wa.left, wa.top, wa.right - wa.left, wa.bottom - wa.top),
            is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            name: String::from_utf16_lossy(&info.szDevice[..name_len]),
        });
    }
    TRUE
}

fn executable_name(pid: u32) -> String {
    if pid == 0 {
        return String::new();
    }
    unsafe {
        let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) else {
            return String::new();
        };
        let mut buf = [0u16; 260];
        let mut len = buf.len() as u32;
        let ok = QueryFullProcessImageNameW(handle, PROCESS_NAME_FORMAT(0), PWSTR(buf.as_mut_ptr()), &mut len);
        let _ = CloseHandle(handle);
        if ok.is_err() {
            return String::new();
        }
        let path = String::from_utf16_lossy(&buf[..len as usize]);
        path.rsplit('\\').next().unwrap_or_default().to_string()
    }
}

fn window_info(hwnd: HWND) -> Option<WindowInfo> {
    unsafe {
        if !IsWindowVisible(hwnd).as_bool() {
            return None;
        }
        let mut buf = [0u16; 512];
        let len = GetWindowTextW(hwnd, &mut buf);
        if len <= 0 {
            return None;
        }
        let title = String::from_utf16_lossy(&buf[..len as usize]);
        if title.trim().is_empty() {
            return None;
        }
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
        Some(WindowInfo {
            hwnd: to_id(hwnd),
            title,
            process_id: pid,
            executable: executable_name(pid),
        })
    }
}

/// Native Win32 platform queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

impl PlatformQuery for NativePlatform {
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>, Win32Error> {
        let mut handles: Vec<HWND> = Vec::new();
        unsafe { EnumWindows(Some(collect_window), LPARAM(&mut handles as *mut Vec<HWND> as isize)) }
            .map_err(|e| Win32Error::EnumerationFailed(e.to_string()))?;
        Ok(handles.into_iter().filter_map(window_info).collect())
    }

    fn foreground_window(&self) -> Result<Option<WindowInfo>, Win32Error> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            return Ok(None);
        }
        Ok(window_info(hwnd))
    }

    fn close_window(&self, hwnd: WindowId) -> Result<(), Win32Error> {
        unsafe { PostMessageW(Some(to_hwnd(hwnd)), WM_CLOSE, WPARAM(0), LPARAM(0)) }
            .map_err(|e| Win32Error::CloseFailed(hwnd, e.to_string()))
    }

    fn terminate_process(&self, pid: u32) -> Result<(), Win32Error> {
        unsafe {
            let handle = OpenProcess(PROCESS_TERMINATE, false, pid)
                .map_err(|e| Win32Error::TerminateFailed(pid, e.to_string()))?;
            let result = TerminateProcess(handle, 1).map_err(|e| Win32Error::TerminateFailed(pid, e.to_string()));
            let _ = CloseHandle(handle);
            result
        }
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        unsafe {
            let handle = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
                Ok(handle) => handle,
                // The process exists but belongs to someone else.
                Err(e) if e.code() == E_ACCESSDENIED => return true,
                Err(_) => return false,
            };
            let mut code = 0u32;
            let alive = GetExitCodeProcess(handle, &mut code).is_ok() && code == STILL_ACTIVE;
            let _ = CloseHandle(handle);
            alive
        }
    }

    fn enumerate_displays(&self) -> Result<Vec<DisplayInfo>, Win32Error> {
        let mut displays: Vec<DisplayInfo> = Vec::new();
        let ok = unsafe {
            EnumDisplayMonitors(
                None,
                None,
                Some(collect_monitor),
                LPARAM(&mut displays as *mut Vec<DisplayInfo> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(Win32Error::MonitorQueryFailed("EnumDisplayMonitors failed".to_string()));
        }
        Ok(displays)
    }

    fn cursor_position(&self) -> Result<(f64, f64), Win32Error> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }.map_err(|e| Win32Error::CursorQueryFailed(e.to_string()))?;
        Ok((f64::from(point.x), f64::from(point.y)))
    }
}

/// A renderer-owned window driven through its HWND.
#[derive(Debug)]
pub struct NativeHostWindow {
    // Stored as an integer so the wrapper is Send.
    raw: WindowId,
}

impl NativeHostWindow {
    /// Wrap an existing window handle.
    pub fn attach(id: WindowId) -> Result<Self, Win32Error> {
        if !unsafe { IsWindow(Some(to_hwnd(id))) }.as_bool() {
            return Err(Win32Error::WindowNotFound(id));
        }
        Ok(Self { raw: id })
    }

    fn hwnd(&self) -> HWND {
        to_hwnd(self.raw)
    }
}

impl HostWindow for NativeHostWindow {
    fn set_bounds(&mut self, bounds: Rect) -> Result<(), Win32Error> {
        unsafe {
            SetWindowPos(
                self.hwnd(),
                None,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                SWP_NOACTIVATE | SWP_NOZORDER,
            )
        }
        .map_err(|e| Win32Error::SetPositionFailed(e.to_string()))
    }

    fn show(&mut self) -> Result<(), Win32Error> {
        unsafe {
            let _ = ShowWindow(self.hwnd(), SW_SHOWNA);
        }
        Ok(())
    }

    fn hide(&mut self) -> Result<(), Win32Error> {
        unsafe {
            let _ = ShowWindow(self.hwnd(), SW_HIDE);
        }
        Ok(())
    }

    fn set_always_on_top(&mut self, on_top: bool) -> Result<(), Win32Error> {
        let insert_after = if on_top { HWND_TOPMOST } else { HWND_NOTOPMOST };
        unsafe {
            SetWindowPos(
                self.hwnd(),
                Some(insert_after),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            )
        }
        .map_err(|e| Win32Error::SetPositionFailed(e.to_string()))
    }

    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<(), Win32Error> {
        let hwnd = self.hwnd();
        unsafe {
            let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
            let transparent = WS_EX_TRANSPARENT.0 as isize;
            let updated = if ignore {
                style | transparent | WS_EX_LAYERED.0 as isize
            } else {
                style & !transparent
            };
            if updated != style {
                SetWindowLongPtrW(hwnd, GWL_EXSTYLE, updated);
            }
        }
        // WS_EX_TRANSPARENT starves the renderer of mouse input; with
        // `forward` the daemon samples the cursor instead.
        tracing::trace!(ignore, forward, "click-through updated");
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        !unsafe { IsWindow(Some(self.hwnd())) }.as_bool()
    }
}
