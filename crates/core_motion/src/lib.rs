//! Edgebar Core Motion
//!
//! Platform-agnostic motion engine for the edgebar sidebar.
//!
//! The sidebar is a slim pill docked to a screen edge that expands into a
//! widget panel. Everything in this crate revolves around a single scalar,
//! the expansion progress in `[0, 1]`:
//! - [`gesture`] turns raw pointer samples into drag deltas and velocities
//! - [`policy`] decides where a released gesture should come to rest
//! - [`animation`] eases progress (or explicit bounds) over time
//! - [`mapper`] turns progress into the panel box and host window bounds
//! - [`display`] resolves and clamps against monitor work areas
//! - [`engine`] owns the progress value and arbitrates between them
//!
//! All operations take time as milliseconds so the engine is deterministic
//! and can be driven by any clock.

pub mod animation;
pub mod display;
pub mod engine;
pub mod gesture;
pub mod mapper;
pub mod policy;

use serde::{Deserialize, Serialize};

pub use animation::{scaled_duration, AnimationDriver, Easing, Settle};
pub use display::{clamp_axis, clamp_rect, resolve_display, DisplayInfo};
pub use engine::{EnginePhase, Frame, PointerOutcome, SidebarEngine};
pub use gesture::{GestureConfig, GestureSummary, GestureTracker, PointerSample, PressOutcome};
pub use mapper::{map_progress, ApplyThrottle, Geometry, GeometryConfig, PanelBox};
pub use policy::{decide, Decision, DecisionThresholds};

/// A rectangle in screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Check whether a point lies inside this rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64 && x < self.right() as f64 && y >= self.y as f64 && y < self.bottom() as f64
    }

    /// Interpolate every component towards `other`.
    pub fn lerp(&self, other: &Rect, t: f64) -> Rect {
        let mix = |a: i32, b: i32| (a as f64 + (b - a) as f64 * t).round() as i32;
        Rect::new(
            mix(self.x, other.x),
            mix(self.y, other.y),
            mix(self.width, other.width),
            mix(self.height, other.height),
        )
    }
}

/// Linear interpolation between two scalars.
pub(crate) fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Clamp a progress value into `[0, 1]`, mapping NaN to 0.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0, 0, 100, 100);
        assert!(r.contains(0.0, 0.0));
        assert!(r.contains(99.5, 50.0));
        assert!(!r.contains(100.0, 50.0));
        assert!(!r.contains(-1.0, 50.0));
    }

    #[test]
    fn test_rect_lerp_endpoints() {
        let a = Rect::new(0, 0, 20, 150);
        let b = Rect::new(0, 100, 490, 440);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Rect::new(0, 50, 255, 295));
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-0.5), 0.0);
        assert_eq!(clamp_progress(1.7), 1.0);
        assert_eq!(clamp_progress(0.25), 0.25);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
    }
}
