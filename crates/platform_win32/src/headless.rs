//! In-memory host window.
//!
//! Used when no renderer window is attached on a platform without native
//! window support, and by tests that need to observe what the mirror did.

use crate::{HostWindow, Rect, Win32Error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host window that only records the last applied state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWindow {
    pub bounds: Option<Rect>,
    pub visible: bool,
    pub always_on_top: bool,
    pub ignore_mouse: bool,
    pub forward_mouse: bool,
    /// Number of `set_bounds` calls.
    pub applied: usize,
    destroyed: Arc<AtomicBool>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag shared with clones; setting it simulates the window being torn down.
    pub fn destroy_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.destroyed)
    }
}

impl HostWindow for HeadlessWindow {
    fn set_bounds(&mut self, bounds: Rect) -> Result<(), Win32Error> {
        tracing::trace!(?bounds, "headless set_bounds");
        self.bounds = Some(bounds);
        self.applied += 1;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Win32Error> {
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), Win32Error> {
        self.visible = false;
        Ok(())
    }

    fn set_always_on_top(&mut self, on_top: bool) -> Result<(), Win32Error> {
        self.always_on_top = on_top;
        Ok(())
    }

    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<(), Win32Error> {
        self.ignore_mouse = ignore;
        self.forward_mouse = forward;
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}
