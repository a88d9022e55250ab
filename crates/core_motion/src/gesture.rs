//! Pointer gesture tracking.
//!
//! A session lives from press to release/cancel:
//!
//! ```text
//! Idle -> Pressed -> SwipeActive -> Idle
//!            \-> Idle (click)
//! ```
//!
//! Horizontal deltas are positive towards expansion.

use serde::{Deserialize, Serialize};

/// A single pointer or touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Event timestamp in milliseconds.
    pub time_ms: f64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, time_ms: f64) -> Self {
        Self { x, y, time_ms }
    }
}

/// Swipe activation and velocity smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Horizontal travel (px) that turns a press into a swipe.
    pub activation_distance: f64,
    /// Collapse-direction speed (px/ms) that turns a press into a swipe.
    pub activation_velocity: f64,
    /// Weight of the newest instantaneous velocity sample.
    pub smoothing: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            activation_distance: 10.0,
            activation_velocity: 0.3,
            smoothing: 0.7,
        }
    }
}

/// Result of [`GestureTracker::press`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressOutcome {
    /// Left to the widget under the pointer.
    Ignored,
    /// Tracking, not yet a swipe.
    Pressed,
    /// Swipe active from the first sample.
    SwipeActive,
}

/// Measurements of a finished swipe, fed to the decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSummary {
    pub delta_x: f64,
    pub elapsed_ms: f64,
    /// Smoothed velocity in px/ms.
    pub velocity: f64,
    /// Progress at the moment the gesture started.
    pub start_progress: f64,
}

#[derive(Debug, Clone)]
struct GestureSession {
    origin: PointerSample,
    last: PointerSample,
    velocity: f64,
    swipe_active: bool,
    start_progress: f64,
}

impl GestureSession {
    fn summary(&self) -> GestureSummary {
        GestureSummary {
            delta_x: self.last.x - self.origin.x,
            elapsed_ms: self.last.time_ms - self.origin.time_ms,
            velocity: self.velocity,
            start_progress: self.start_progress,
        }
    }
}

/// Tracks at most one gesture session.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    config: GestureConfig,
    session: Option<GestureSession>,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, session: None }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a pointer is currently down.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the current session has been classified as a swipe.
    pub fn is_swiping(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.swipe_active)
    }

    /// Progress adopted when the current session started.
    pub fn start_progress(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.start_progress)
    }

    /// Horizontal travel of the current session.
    pub fn delta_x(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.last.x - s.origin.x)
    }

    /// Smoothed velocity of the current session.
    pub fn velocity(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.velocity)
    }

    /// Start a session. Any previous session is dropped.
    ///
    /// `progress` is the committed progress at press time. Presses on a
    /// widget's own control while fully expanded are left to the widget;
    /// presses while collapsed are swipes immediately.
    pub fn press(&mut self, sample: PointerSample, progress: f64, on_widget_control: bool) -> PressOutcome {
        self.session = None;
        if progress >= 1.0 && on_widget_control {
            return PressOutcome::Ignored;
        }

        let swipe_active = progress <= 0.0;
        self.session = Some(GestureSession {
            origin: sample,
            last: sample,
            velocity: 0.0,
            swipe_active,
            start_progress: progress,
        });

        if swipe_active {
            PressOutcome::SwipeActive
        } else {
            PressOutcome::Pressed
        }
    }

    /// Feed a move sample. Returns the horizontal delta while swiping.
    ///
    /// A no-op without a session.
    pub fn move_to(&mut self, sample: PointerSample) -> Option<f64> {
        let config = self.config;
        let session = self.session.as_mut()?;

        let dt = sample.time_ms - session.last.time_ms;
        if dt > 0.0 {
            let instantaneous = (sample.x - session.last.x) / dt;
            session.velocity = config.smoothing * instantaneous + (1.0 - config.smoothing) * session.velocity;
        }
        session.last = sample;

        let delta_x = sample.x - session.origin.x;
        if !session.swipe_active
            && (delta_x.abs() >= config.activation_distance || session.velocity < -config.activation_velocity)
        {
            session.swipe_active = true;
            tracing::trace!(delta_x, velocity = session.velocity, "swipe activated");
        }

        session.swipe_active.then_some(delta_x)
    }

    /// End the session at `sample`.
    ///
    /// Returns `None` for a click (no swipe was activated) or when idle.
    pub fn release(&mut self, sample: PointerSample) -> Option<GestureSummary> {
        if self.session.is_none() {
            return None;
        }
        self.move_to(sample);
        let session = self.session.take()?;
        session.swipe_active.then(|| session.summary())
    }

    /// Abort the session at its last sample.
    ///
    /// Returns the summary of an active swipe so the caller can still settle.
    pub fn cancel(&mut self) -> Option<GestureSummary> {
        let session = self.session.take()?;
        session.swipe_active.then(|| session.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, time_ms: f64) -> PointerSample {
        PointerSample::new(x, 300.0, time_ms)
    }

    #[test]
    fn test_press_on_widget_control_while_expanded_is_ignored() {
        let mut tracker = GestureTracker::default();
        assert_eq!(tracker.press(sample(100.0, 0.0), 1.0, true), PressOutcome::Ignored);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_press_on_widget_control_while_partially_expanded_is_tracked() {
        let mut tracker = GestureTracker::default();
        assert_eq!(tracker.press(sample(100.0, 0.0), 0.5, true), PressOutcome::Pressed);
        assert!(tracker.is_active());
    }

    #[test]
    fn test_press_while_collapsed_swipes_immediately() {
        let mut tracker = GestureTracker::default();
        assert_eq!(tracker.press(sample(5.0, 0.0), 0.0, false), PressOutcome::SwipeActive);
        assert!(tracker.is_swiping());
        assert_eq!(tracker.move_to(sample(7.0, 8.0)), Some(2.0));
    }

    #[test]
    fn test_small_movement_does_not_activate() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(200.0, 0.0), 1.0, false);
        assert_eq!(tracker.move_to(sample(196.0, 100.0)), None);
        assert!(!tracker.is_swiping());
    }

    #[test]
    fn test_distance_threshold_activates() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(200.0, 0.0), 1.0, false);
        assert_eq!(tracker.move_to(sample(190.0, 200.0)), Some(-10.0));
        assert!(tracker.is_swiping());
    }

    #[test]
    fn test_fast_backward_flick_activates_before_distance() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(200.0, 0.0), 1.0, false);
        // 5px in 10ms = -0.5 px/ms, smoothed to -0.35
        assert_eq!(tracker.move_to(sample(195.0, 10.0)), Some(-5.0));
        assert!(tracker.is_swiping());
    }

    #[test]
    fn test_fast_forward_flick_needs_distance() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(200.0, 0.0), 1.0, false);
        assert_eq!(tracker.move_to(sample(205.0, 10.0)), None);
    }

    #[test]
    fn test_velocity_smoothing() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 0.0), 0.0, false);
        tracker.move_to(sample(10.0, 10.0));
        let v1 = tracker.velocity().unwrap();
        assert!((v1 - 0.7).abs() < 1e-9);
        tracker.move_to(sample(10.0, 20.0));
        let v2 = tracker.velocity().unwrap();
        assert!((v2 - 0.21).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_timestamp_keeps_velocity() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 0.0), 0.0, false);
        tracker.move_to(sample(10.0, 10.0));
        tracker.move_to(sample(50.0, 10.0));
        assert!((tracker.velocity().unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(tracker.delta_x(), Some(50.0));
    }

    #[test]
    fn test_release_without_swipe_is_click() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(200.0, 0.0), 1.0, false);
        assert_eq!(tracker.release(sample(201.0, 80.0)), None);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_release_summary() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 1000.0), 0.0, false);
        tracker.move_to(sample(40.0, 1050.0));
        let summary = tracker.release(sample(80.0, 1100.0)).unwrap();
        assert_eq!(summary.delta_x, 80.0);
        assert_eq!(summary.elapsed_ms, 100.0);
        assert_eq!(summary.start_progress, 0.0);
        assert!(summary.velocity > 0.0);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_move_after_release_is_noop() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 0.0), 0.0, false);
        tracker.release(sample(30.0, 50.0));
        assert_eq!(tracker.move_to(sample(90.0, 60.0)), None);
        assert!(!tracker.is_active());
        assert_eq!(tracker.release(sample(90.0, 70.0)), None);
    }

    #[test]
    fn test_cancel_reports_active_swipe() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 0.0), 0.0, false);
        tracker.move_to(sample(25.0, 40.0));
        let summary = tracker.cancel().unwrap();
        assert_eq!(summary.delta_x, 25.0);
        assert_eq!(tracker.cancel(), None);
    }

    #[test]
    fn test_new_press_replaces_session() {
        let mut tracker = GestureTracker::default();
        tracker.press(sample(0.0, 0.0), 0.0, false);
        tracker.move_to(sample(25.0, 40.0));
        tracker.press(sample(300.0, 100.0), 0.4, false);
        assert_eq!(tracker.start_progress(), Some(0.4));
        assert_eq!(tracker.delta_x(), Some(0.0));
        assert!(!tracker.is_swiping());
    }
}
