//! Time-based easing of the expansion progress.
//!
//! A single [`AnimationDriver`] replaces the ease-and-tick loops that every
//! caller (expand, collapse, explicit resize) would otherwise carry. Only one
//! animation runs at a time; starting a new one drops the previous one before
//! anything else happens.

use crate::{clamp_progress, lerp, Rect};
use serde::{Deserialize, Serialize};

/// Nominal duration of expand/collapse transitions.
pub const EXPAND_DURATION_MS: f64 = 300.0;
/// Nominal duration of explicit resize transitions.
pub const RESIZE_DURATION_MS: f64 = 200.0;

/// Easing curve applied to normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Generic resize.
    #[default]
    EaseOutCubic,
    /// Expand/collapse, snappier finish.
    EaseOutQuart,
}

impl Easing {
    /// Eased value for normalized time `t` (clamped to `[0, 1]`).
    pub fn ease(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// Divide a nominal duration by the user speed multiplier.
///
/// Non-positive or non-finite multipliers are treated as 1.
pub fn scaled_duration(nominal_ms: f64, speed: f64) -> f64 {
    let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
    nominal_ms / speed
}

/// Cleanup to run once an animation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settle {
    /// Nothing beyond the final frame.
    None,
    /// Reset the host window to its resting size and clear visual overrides.
    Collapsed,
    /// Release the placeholder width held while growing.
    Expanded,
}

/// Value being animated.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Track {
    Progress { from: f64, to: f64 },
    Bounds { from: Rect, to: Rect },
}

#[derive(Debug, Clone)]
struct Animation {
    track: Track,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
    settle: Settle,
}

/// Value produced by one animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Progress(f64),
    Bounds(Rect),
}

/// Result of [`AnimationDriver::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub step: Step,
    /// Set on the final tick, carrying the cleanup to perform.
    pub finished: Option<Settle>,
}

/// Owner of the committed progress while an eased transition runs.
#[derive(Debug, Clone, Default)]
pub struct AnimationDriver {
    progress: f64,
    active: Option<Animation>,
}

impl AnimationDriver {
    pub fn new(progress: f64) -> Self {
        Self {
            progress: clamp_progress(progress),
            active: None,
        }
    }

    /// Last committed progress (the value of the most recent frame).
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the running progress animation, if any.
    pub fn target(&self) -> Option<f64> {
        match self.active.as_ref()?.track {
            Track::Progress { to, .. } => Some(to),
            Track::Bounds { .. } => None,
        }
    }

    /// Commit a progress value written by someone else (a live gesture).
    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
    }

    /// Stop the running animation and return the committed progress.
    pub fn cancel(&mut self) -> f64 {
        if self.active.take().is_some() {
            tracing::trace!(progress = self.progress, "animation cancelled");
        }
        self.progress
    }

    /// Ease the progress from its committed value to `target`.
    pub fn animate_to(&mut self, target: f64, duration_ms: f64, easing: Easing, settle: Settle, now_ms: f64) {
        self.cancel();
        self.active = Some(Animation {
            track: Track::Progress {
                from: self.progress,
                to: clamp_progress(target),
            },
            start_ms: now_ms,
            duration_ms,
            easing,
            settle,
        });
    }

    /// Ease explicit window bounds from `from` to `to`.
    pub fn animate_bounds(&mut self, from: Rect, to: Rect, duration_ms: f64, easing: Easing, now_ms: f64) {
        self.cancel();
        self.active = Some(Animation {
            track: Track::Bounds { from, to },
            start_ms: now_ms,
            duration_ms,
            easing,
            settle: Settle::None,
        });
    }

    /// Advance the running animation to `now_ms`.
    ///
    /// Returns `None` when idle. The final tick lands exactly on the target
    /// and ends the animation.
    pub fn tick(&mut self, now_ms: f64) -> Option<Tick> {
        let animation = self.active.as_ref()?;
        let t = if animation.duration_ms > 0.0 {
            ((now_ms - animation.start_ms) / animation.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let done = t >= 1.0;
        let eased = animation.easing.ease(t);

        let step = match animation.track {
            Track::Progress { from, to } => {
                self.progress = if done { to } else { clamp_progress(lerp(from, to, eased)) };
                Step::Progress(self.progress)
            }
            Track::Bounds { from, to } => Step::Bounds(if done { to } else { from.lerp(&to, eased) }),
        };

        let finished = if done {
            self.active.take().map(|a| a.settle)
        } else {
            None
        };

        Some(Tick { step, finished })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_of(tick: Option<Tick>) -> f64 {
        match tick.map(|t| t.step) {
            Some(Step::Progress(p)) => p,
            other => panic!("expected progress step, got {:?}", other),
        }
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseOutQuart] {
            assert_eq!(easing.ease(0.0), 0.0);
            assert_eq!(easing.ease(1.0), 1.0);
            assert_eq!(easing.ease(-1.0), 0.0);
            assert_eq!(easing.ease(2.0), 1.0);
        }
    }

    #[test]
    fn test_quartic_finishes_faster_than_cubic() {
        assert!(Easing::EaseOutQuart.ease(0.5) > Easing::EaseOutCubic.ease(0.5));
        assert!(Easing::EaseOutCubic.ease(0.5) > Easing::Linear.ease(0.5));
    }

    #[test]
    fn test_scaled_duration() {
        assert_eq!(scaled_duration(300.0, 1.0), 300.0);
        assert_eq!(scaled_duration(300.0, 2.0), 150.0);
        assert_eq!(scaled_duration(300.0, 0.5), 600.0);
        assert_eq!(scaled_duration(300.0, 0.0), 300.0);
        assert_eq!(scaled_duration(300.0, -3.0), 300.0);
        assert_eq!(scaled_duration(300.0, f64::NAN), 300.0);
    }

    #[test]
    fn test_idle_driver_does_not_tick() {
        let mut driver = AnimationDriver::new(0.0);
        assert!(driver.tick(10.0).is_none());
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_animation_reaches_target_exactly() {
        let mut driver = AnimationDriver::new(0.0);
        driver.animate_to(1.0, 300.0, Easing::EaseOutQuart, Settle::Expanded, 1000.0);

        let mid = progress_of(driver.tick(1150.0));
        assert!(mid > 0.5 && mid < 1.0);
        assert!(driver.is_animating());

        let last = driver.tick(1400.0).expect("final tick");
        assert_eq!(last.step, Step::Progress(1.0));
        assert_eq!(last.finished, Some(Settle::Expanded));
        assert!(!driver.is_animating());
        assert_eq!(driver.progress(), 1.0);
    }

    #[test]
    fn test_progress_is_monotonic_during_animation() {
        let mut driver = AnimationDriver::new(1.0);
        driver.animate_to(0.0, 300.0, Easing::EaseOutQuart, Settle::Collapsed, 0.0);
        let mut last = 1.0;
        for ms in (0..=300).step_by(16) {
            let p = progress_of(driver.tick(ms as f64));
            assert!(p <= last);
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn test_cancel_adopts_committed_progress() {
        let mut driver = AnimationDriver::new(0.0);
        driver.animate_to(1.0, 300.0, Easing::EaseOutQuart, Settle::Expanded, 0.0);
        let p0 = progress_of(driver.tick(100.0));

        let adopted = driver.cancel();
        assert_eq!(adopted, p0);
        assert!(!driver.is_animating());
        assert!(driver.tick(200.0).is_none());
    }

    #[test]
    fn test_new_animation_replaces_running_one() {
        let mut driver = AnimationDriver::new(0.0);
        driver.animate_to(1.0, 300.0, Easing::EaseOutQuart, Settle::Expanded, 0.0);
        let p0 = progress_of(driver.tick(100.0));

        driver.animate_to(0.0, 300.0, Easing::EaseOutQuart, Settle::Collapsed, 100.0);
        assert_eq!(driver.target(), Some(0.0));
        // First tick of the new animation starts from where the old one stopped.
        assert_eq!(progress_of(driver.tick(100.0)), p0);

        let last = driver.tick(400.0).expect("final tick");
        assert_eq!(last.finished, Some(Settle::Collapsed));
        assert_eq!(driver.progress(), 0.0);
    }

    #[test]
    fn test_zero_duration_lands_immediately() {
        let mut driver = AnimationDriver::new(0.0);
        driver.animate_to(1.0, 0.0, Easing::EaseOutQuart, Settle::None, 0.0);
        let tick = driver.tick(0.0).expect("tick");
        assert_eq!(tick.step, Step::Progress(1.0));
        assert_eq!(tick.finished, Some(Settle::None));
    }

    #[test]
    fn test_bounds_animation_keeps_progress() {
        let mut driver = AnimationDriver::new(1.0);
        let from = Rect::new(0, 100, 502, 440);
        let to = Rect::new(0, 50, 600, 500);
        driver.animate_bounds(from, to, 200.0, Easing::EaseOutCubic, 0.0);

        match driver.tick(100.0).map(|t| t.step) {
            Some(Step::Bounds(r)) => {
                assert!(r.width > 502 && r.width < 600);
                assert!(r.y < 100 && r.y > 50);
            }
            other => panic!("expected bounds step, got {:?}", other),
        }
        let last = driver.tick(250.0).expect("final tick");
        assert_eq!(last.step, Step::Bounds(to));
        assert_eq!(driver.progress(), 1.0);
        assert_eq!(driver.target(), None);
    }
}
