//! Window discovery and termination on top of a [`PlatformQuery`].
//!
//! Platform failures never propagate from here: they are logged and the
//! operation degrades to an empty result or a no-op.

use crate::{DisplayInfo, PlatformQuery, WindowId, WindowInfo};
use std::collections::{BTreeSet, VecDeque};

/// Default number of foreground activations remembered.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Windows whose title contains any keyword (case-insensitive), excluding
/// windows owned by `own_pid`.
pub fn filter_by_keywords(windows: Vec<WindowInfo>, keywords: &[String], own_pid: u32) -> Vec<WindowInfo> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Vec::new();
    }

    windows
        .into_iter()
        .filter(|w| w.process_id != own_pid)
        .filter(|w| {
            let title = w.title.to_lowercase();
            keywords.iter().any(|k| title.contains(k.as_str()))
        })
        .collect()
}

/// Recent foreground windows, most recent first, one entry per handle.
#[derive(Debug, Clone)]
pub struct ForegroundHistory {
    entries: VecDeque<WindowInfo>,
    limit: usize,
    blacklist: Vec<String>,
}

impl Default for ForegroundHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ForegroundHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
            blacklist: Vec::new(),
        }
    }

    /// Replace the blacklist. Entries already recorded that now match are dropped.
    pub fn set_blacklist(&mut self, entries: Vec<String>) {
        self.blacklist = entries
            .into_iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        let blacklist = &self.blacklist;
        self.entries.retain(|w| !matches_blacklist(blacklist, w));
    }

    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    pub fn is_blacklisted(&self, window: &WindowInfo) -> bool {
        matches_blacklist(&self.blacklist, window)
    }

    /// Record an activation. Returns false if the window is blacklisted.
    pub fn record(&mut self, window: WindowInfo) -> bool {
        if self.is_blacklisted(&window) {
            return false;
        }
        self.entries.retain(|w| w.hwnd != window.hwnd);
        self.entries.push_front(window);
        self.entries.truncate(self.limit);
        true
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&WindowInfo> {
        self.entries.front()
    }

    pub fn remove(&mut self, hwnd: WindowId) {
        self.entries.retain(|w| w.hwnd != hwnd);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn matches_blacklist(blacklist: &[String], window: &WindowInfo) -> bool {
    let title = window.title.to_lowercase();
    let executable = window.executable.to_lowercase();
    blacklist
        .iter()
        .any(|entry| title.contains(entry.as_str()) || executable.contains(entry.as_str()))
}

/// Discovery, history and termination, owned by the main loop.
pub struct WindowDiscovery<P> {
    platform: P,
    own_pid: u32,
    history: ForegroundHistory,
}

impl<P: PlatformQuery> WindowDiscovery<P> {
    pub fn new(platform: P, own_pid: u32, history: ForegroundHistory) -> Self {
        Self {
            platform,
            own_pid,
            history,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn history(&self) -> &ForegroundHistory {
        &self.history
    }

    pub fn set_blacklist(&mut self, entries: Vec<String>) {
        tracing::info!(count = entries.len(), "window blacklist updated");
        self.history.set_blacklist(entries);
    }

    /// Windows whose title matches any keyword, excluding our own.
    pub fn find_windows(&self, keywords: &[String]) -> Vec<WindowInfo> {
        match self.platform.enumerate_windows() {
            Ok(windows) => filter_by_keywords(windows, keywords, self.own_pid),
            Err(e) => {
                tracing::warn!("Window enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    /// The current foreground window, if it belongs to another process.
    pub fn foreground(&self) -> Option<WindowInfo> {
        match self.platform.foreground_window() {
            Ok(window) => window.filter(|w| w.process_id != self.own_pid),
            Err(e) => {
                tracing::debug!("Foreground query failed: {}", e);
                None
            }
        }
    }

    /// Sample the foreground window into the history.
    ///
    /// Returns the window if it became the new most recent entry.
    pub fn poll_foreground(&mut self) -> Option<WindowInfo> {
        let window = self.foreground()?;
        if self.history.latest().is_some_and(|w| w.hwnd == window.hwnd) {
            return None;
        }
        if self.history.record(window.clone()) {
            tracing::trace!(hwnd = window.hwnd, title = %window.title, "foreground recorded");
            Some(window)
        } else {
            None
        }
    }

    /// Ask the most recently used window to close.
    ///
    /// Entries that can no longer be closed are dropped and the next one is
    /// tried. Returns the window a close request was delivered to.
    pub fn close_last_window(&mut self) -> Option<WindowInfo> {
        while let Some(window) = self.history.latest().cloned() {
            self.history.remove(window.hwnd);
            if window.process_id == self.own_pid {
                continue;
            }
            match self.platform.close_window(window.hwnd) {
                Ok(()) => {
                    tracing::info!(hwnd = window.hwnd, title = %window.title, "Close requested");
                    return Some(window);
                }
                Err(e) => tracing::warn!("Failed to close window {}: {}", window.hwnd, e),
            }
        }
        None
    }

    /// Force-terminate the processes owning windows that match `keywords`.
    ///
    /// Returns the ids of the processes that were terminated.
    pub fn kill_conflicting(&self, keywords: &[String]) -> Vec<u32> {
        let pids: BTreeSet<u32> = self
            .find_windows(keywords)
            .into_iter()
            .map(|w| w.process_id)
            .filter(|pid| *pid != 0)
            .collect();

        pids.into_iter()
            .filter(|pid| match self.platform.terminate_process(*pid) {
                Ok(()) => {
                    tracing::info!(pid, "Terminated conflicting process");
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to terminate process {}: {}", pid, e);
                    false
                }
            })
            .collect()
    }

    /// Connected monitors, empty if the query failed.
    pub fn displays(&self) -> Vec<DisplayInfo> {
        match self.platform.enumerate_displays() {
            Ok(displays) => displays,
            Err(e) => {
                tracing::warn!("Monitor enumeration failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Cursor position, `None` if the platform cannot report it.
    pub fn cursor_position(&self) -> Option<(f64, f64)> {
        self.platform
            .cursor_position()
            .map_err(|e| tracing::trace!("Cursor query failed: {}", e))
            .ok()
    }
}
