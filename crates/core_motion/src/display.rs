//! Display geometry resolution.
//!
//! Monitors can come and go at runtime, so callers cache the monitor list and
//! resolve the target work area on every frame instead of caching the result.

use crate::Rect;
use serde::{Deserialize, Serialize};

/// Work area used when no monitor could be enumerated at all.
pub const FALLBACK_WORK_AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 1920,
    height: 1040,
};

/// A connected monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    /// Platform identifier (HMONITOR on Windows).
    pub id: u64,
    /// Full monitor bounds.
    pub bounds: Rect,
    /// Usable area excluding taskbars and docks.
    pub work_area: Rect,
    /// Whether the OS designates this monitor as primary.
    pub is_primary: bool,
    /// Device name, stable across restarts.
    pub name: String,
}

/// Resolve the work area of the configured display.
///
/// An index that is negative or past the end falls back to the primary
/// display (or the first one if none is flagged primary). An empty list
/// yields [`FALLBACK_WORK_AREA`].
pub fn resolve_display(display_index: i64, displays: &[DisplayInfo]) -> Rect {
    let selected = usize::try_from(display_index)
        .ok()
        .and_then(|i| displays.get(i))
        .or_else(|| displays.iter().find(|d| d.is_primary))
        .or_else(|| displays.first());

    selected.map_or(FALLBACK_WORK_AREA, |d| d.work_area)
}

/// Clamp a position on one axis so that `[desired, desired + size)` stays
/// within `[origin, origin + extent)`.
///
/// A window larger than the container is pinned to the container origin.
pub fn clamp_axis(desired: i32, size: i32, origin: i32, extent: i32) -> i32 {
    if size >= extent {
        return origin;
    }
    desired.clamp(origin, origin + extent - size)
}

/// Clamp the position of `desired` into `container`, keeping its size.
pub fn clamp_rect(desired: Rect, container: Rect) -> Rect {
    Rect {
        x: clamp_axis(desired.x, desired.width, container.x, container.width),
        y: clamp_axis(desired.y, desired.height, container.y, container.height),
        ..desired
    }
}
