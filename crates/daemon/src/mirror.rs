//! Window mirror.
//!
//! The only code allowed to move the host window. It applies the most recent
//! frame computed by the engine, throttling intermediate frames so the window
//! manager is not flooded with resizes.

use edgebar_core_motion::{clamp_rect, ApplyThrottle, Frame, Rect};
use edgebar_platform_win32::{HostWindow, Win32Error};
use tracing::{debug, info, warn};

/// What happened to a frame handed to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// No host window is attached.
    Detached,
    /// Bounds were written to the host window.
    Applied,
    /// Dropped by the throttle; a later frame supersedes it.
    Throttled,
    /// Already at these bounds.
    Unchanged,
    /// The host window is gone. The caller must stop animating.
    Destroyed,
    /// The platform refused the new bounds.
    Failed,
}

pub struct WindowMirror {
    host: Option<Box<dyn HostWindow>>,
    throttle: ApplyThrottle,
    last_bounds: Option<Rect>,
    /// Latest frame dropped by the throttle, applied by [`WindowMirror::flush`].
    pending: Option<Frame>,
    mouse: Option<(bool, bool)>,
}

impl Default for WindowMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowMirror {
    pub fn new() -> Self {
        Self {
            host: None,
            throttle: ApplyThrottle::default(),
            last_bounds: None,
            pending: None,
            mouse: None,
        }
    }

    /// Take ownership of a host window, show it and pin it above other windows.
    pub fn attach(&mut self, mut host: Box<dyn HostWindow>) -> Result<(), Win32Error> {
        host.set_always_on_top(true)?;
        host.show()?;
        self.host = Some(host);
        self.throttle.reset();
        self.last_bounds = None;
        self.pending = None;
        self.mouse = None;
        info!("Host window attached");
        Ok(())
    }

    pub fn detach(&mut self) {
        if self.host.take().is_some() {
            info!("Host window detached");
        }
        self.last_bounds = None;
        self.pending = None;
        self.mouse = None;
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Mirror a frame onto the host window.
    ///
    /// The window is clamped into `work_area` so it can never end up off
    /// screen, whatever the frame says.
    pub fn apply(&mut self, frame: &Frame, work_area: Rect, now_ms: f64) -> MirrorOutcome {
        let Some(host) = self.host.as_mut() else {
            return MirrorOutcome::Detached;
        };
        if host.is_destroyed() {
            debug!("Host window destroyed, dropping it");
            self.detach();
            return MirrorOutcome::Destroyed;
        }
        if !self.throttle.admit(now_ms, frame.resting) {
            self.pending = Some(*frame);
            return MirrorOutcome::Throttled;
        }
        self.pending = None;

        let bounds = clamp_rect(frame.window, work_area);
        if self.last_bounds == Some(bounds) {
            return MirrorOutcome::Unchanged;
        }
        match host.set_bounds(bounds) {
            Ok(()) => {
                self.last_bounds = Some(bounds);
                MirrorOutcome::Applied
            }
            Err(e) => {
                warn!("Failed to apply window bounds: {}", e);
                MirrorOutcome::Failed
            }
        }
    }

    /// Apply the last throttled frame once the throttle lets it through.
    ///
    /// Returns `None` when nothing is pending.
    pub fn flush(&mut self, work_area: Rect, now_ms: f64) -> Option<MirrorOutcome> {
        let frame = self.pending.take()?;
        Some(self.apply(&frame, work_area, now_ms))
    }

    /// Whether the window ignores the mouse while the cursor is tracked
    /// on its behalf.
    pub fn is_forwarding(&self) -> bool {
        self.mouse == Some((true, true))
    }

    /// Toggle click-through. Returns whether the window state changed.
    pub fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<bool, Win32Error> {
        let Some(host) = self.host.as_mut() else {
            return Ok(false);
        };
        if self.mouse == Some((ignore, forward)) {
            return Ok(false);
        }
        host.set_ignore_mouse_events(ignore, forward)?;
        self.mouse = Some((ignore, forward));
        debug!(ignore, forward, "Click-through updated");
        Ok(true)
    }
}
