//! The sidebar engine.
//!
//! Owns the expansion progress and hands it to exactly one writer at a time:
//! the gesture tracker while a swipe is live, the animation driver while an
//! eased transition runs. Configuration and work area updates are absorbed by
//! the next frame computed.

use crate::animation::{
    scaled_duration, AnimationDriver, Easing, Settle, Step, EXPAND_DURATION_MS, RESIZE_DURATION_MS,
};
use crate::display::clamp_rect;
use crate::gesture::{GestureConfig, GestureSummary, GestureTracker, PointerSample, PressOutcome};
use crate::mapper::{anchor_center, map_progress, place_vertically, GeometryConfig, PanelBox, PILL_WIDTH};
use crate::policy::{decide, Decision, DecisionThresholds};
use crate::{clamp_progress, Rect};
use serde::{Deserialize, Serialize};

/// Coarse state of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Collapsed,
    Expanded,
    /// A pointer is down on the bar.
    Dragging,
    Animating,
}

/// Everything the renderer and the window mirror need for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub progress: f64,
    pub panel: PanelBox,
    /// Host window bounds in screen pixels.
    pub window: Rect,
    /// Width reserved for the widget layout while expanding.
    pub placeholder_width: Option<f64>,
    /// Resting frames are applied without throttling.
    pub resting: bool,
    /// Set on the last frame of an animation.
    pub settle: Option<Settle>,
}

/// Result of feeding a pointer event to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerOutcome {
    /// No session, or the press belongs to a widget.
    Ignored,
    /// Pointer is down but not swiping yet.
    Tracking,
    /// The swipe moved the panel.
    Frame { frame: Frame },
    /// Released without swiping; pass the click through.
    Click,
    /// Released; the panel now animates towards the decision.
    Settling { decision: Decision },
}

#[derive(Debug, Clone)]
pub struct SidebarEngine {
    config: GeometryConfig,
    work_area: Rect,
    speed: f64,
    thresholds: DecisionThresholds,
    tracker: GestureTracker,
    driver: AnimationDriver,
    /// Explicit bounds from a resize request, replacing the mapped window.
    window_override: Option<Rect>,
    placeholder_width: Option<f64>,
    /// A resting frame must be emitted on the next tick.
    stale: bool,
}

impl SidebarEngine {
    /// Create a collapsed engine.
    pub fn new(config: GeometryConfig, work_area: Rect) -> Self {
        Self {
            config,
            work_area,
            speed: 1.0,
            thresholds: DecisionThresholds::default(),
            tracker: GestureTracker::default(),
            driver: AnimationDriver::new(0.0),
            window_override: None,
            placeholder_width: None,
            stale: true,
        }
    }

    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.tracker = GestureTracker::new(config);
        self
    }

    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Committed progress.
    pub fn progress(&self) -> f64 {
        self.driver.progress()
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Progress adopted by the current gesture, if one is live.
    pub fn gesture_start_progress(&self) -> Option<f64> {
        self.tracker.start_progress()
    }

    pub fn phase(&self) -> EnginePhase {
        if self.tracker.is_active() {
            EnginePhase::Dragging
        } else if self.driver.is_animating() {
            EnginePhase::Animating
        } else if self.driver.progress() >= 1.0 {
            EnginePhase::Expanded
        } else {
            EnginePhase::Collapsed
        }
    }

    /// Replace the geometry configuration. Last write wins.
    pub fn set_geometry_config(&mut self, config: GeometryConfig) {
        if self.config != config {
            tracing::debug!(?config, "geometry configuration updated");
            self.config = config;
            self.stale = true;
        }
    }

    /// Replace the work area the bar is docked in.
    pub fn set_work_area(&mut self, work_area: Rect) {
        if self.work_area != work_area {
            tracing::debug!(?work_area, "work area updated");
            self.work_area = work_area;
            self.stale = true;
        }
    }

    /// Set the animation speed multiplier. Non-positive values act as 1.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
    }

    /// Frame for the committed state, without advancing time.
    pub fn current_frame(&self) -> Frame {
        let geometry = map_progress(self.driver.progress(), &self.config, self.work_area);
        let window = self
            .window_override
            .map_or(geometry.window, |bounds| clamp_rect(bounds, self.work_area));
        Frame {
            progress: geometry.progress,
            panel: geometry.panel,
            window,
            placeholder_width: self.placeholder_width,
            resting: geometry.is_resting() && !self.driver.is_animating(),
            settle: None,
        }
    }

    /// Screen area that should receive pointer events. Everything else in
    /// the host window is click-through.
    pub fn interactive_region(&self) -> Rect {
        let frame = self.current_frame();
        if frame.progress <= 0.0 {
            return frame.window;
        }
        let scale = self.config.scale;
        let width = (((frame.panel.margin_left + frame.panel.width) * scale).ceil() as i32).min(frame.window.width);
        let height = ((frame.panel.height * scale).ceil() as i32).min(frame.window.height);
        Rect::new(
            frame.window.x,
            frame.window.y + (frame.window.height - height) / 2,
            width,
            height,
        )
    }

    /// Horizontal travel (screen px) that spans the full progress range.
    fn drag_range(&self) -> f64 {
        ((self.config.panel_width - PILL_WIDTH) * self.config.scale).max(1.0)
    }

    fn drag_progress(&self, delta_x: f64) -> f64 {
        let start = self.tracker.start_progress().unwrap_or_else(|| self.driver.progress());
        clamp_progress(start + delta_x / self.drag_range())
    }

    pub fn pointer_down(&mut self, sample: PointerSample, on_widget_control: bool) -> PointerOutcome {
        let committed = self.driver.progress();
        match self.tracker.press(sample, committed, on_widget_control) {
            PressOutcome::Ignored => PointerOutcome::Ignored,
            outcome => {
                // The gesture takes over from wherever the animation was.
                let adopted = self.driver.cancel();
                tracing::debug!(progress = adopted, ?outcome, "gesture started");
                if outcome == PressOutcome::SwipeActive {
                    self.window_override = None;
                }
                PointerOutcome::Tracking
            }
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) -> PointerOutcome {
        let Some(delta_x) = self.tracker.move_to(sample) else {
            return if self.tracker.is_active() {
                PointerOutcome::Tracking
            } else {
                PointerOutcome::Ignored
            };
        };

        self.window_override = None;
        self.driver.set_progress(self.drag_progress(delta_x));
        self.stale = false;
        PointerOutcome::Frame {
            frame: self.current_frame(),
        }
    }

    pub fn pointer_up(&mut self, sample: PointerSample, now_ms: f64) -> PointerOutcome {
        if !self.tracker.is_active() {
            return PointerOutcome::Ignored;
        }
        let start = self.tracker.start_progress();
        match self.tracker.release(sample) {
            Some(summary) => self.finish_swipe(summary, now_ms),
            None => {
                if start.is_some_and(|p| p > 0.0 && p < 1.0) {
                    // A click interrupted an animation; do not leave the panel half open.
                    self.settle_towards(Decision::Collapse, now_ms);
                }
                PointerOutcome::Click
            }
        }
    }

    pub fn pointer_cancel(&mut self, now_ms: f64) -> PointerOutcome {
        let start = self.tracker.start_progress();
        match self.tracker.cancel() {
            Some(summary) => self.finish_swipe(summary, now_ms),
            None if start.is_some_and(|p| p > 0.0 && p < 1.0) => {
                self.settle_towards(Decision::Collapse, now_ms);
                PointerOutcome::Settling {
                    decision: Decision::Collapse,
                }
            }
            None => PointerOutcome::Ignored,
        }
    }

    fn finish_swipe(&mut self, summary: GestureSummary, now_ms: f64) -> PointerOutcome {
        let progress = clamp_progress(summary.start_progress + summary.delta_x / self.drag_range());
        self.driver.set_progress(progress);
        let decision = decide(&summary, &self.thresholds);
        tracing::debug!(
            delta_x = summary.delta_x,
            elapsed_ms = summary.elapsed_ms,
            velocity = summary.velocity,
            ?decision,
            "gesture released"
        );
        self.settle_towards(decision, now_ms);
        PointerOutcome::Settling { decision }
    }

    fn settle_towards(&mut self, decision: Decision, now_ms: f64) {
        let (settle, placeholder) = match decision {
            Decision::Expand => (Settle::Expanded, Some(self.config.panel_width)),
            Decision::Collapse => (Settle::Collapsed, self.placeholder_width),
        };
        self.placeholder_width = placeholder;
        self.driver.animate_to(
            decision.target(),
            scaled_duration(EXPAND_DURATION_MS, self.speed),
            Easing::EaseOutQuart,
            settle,
            now_ms,
        );
    }

    /// Expand without a gesture. Any live gesture is dropped.
    pub fn request_expand(&mut self, now_ms: f64) {
        self.tracker.cancel();
        self.window_override = None;
        self.settle_towards(Decision::Expand, now_ms);
    }

    /// Collapse without a gesture. Any live gesture is dropped.
    pub fn request_collapse(&mut self, now_ms: f64) {
        self.tracker.cancel();
        self.settle_towards(Decision::Collapse, now_ms);
    }

    /// Resize the host window explicitly.
    ///
    /// Without `y` the window is centered on the configured anchor. The
    /// target is clamped into the work area.
    pub fn request_resize(&mut self, width: i32, height: i32, y: Option<i32>, animate: bool, now_ms: f64) {
        self.tracker.cancel();
        let width = width.max(1);
        let height = height.max(1);
        let y = y.unwrap_or_else(|| {
            place_vertically(anchor_center(&self.config, self.work_area), height, self.work_area)
        });
        let target = clamp_rect(Rect::new(self.work_area.x, y, width, height), self.work_area);

        if animate {
            let from = self.current_frame().window;
            self.driver.animate_bounds(
                from,
                target,
                scaled_duration(RESIZE_DURATION_MS, self.speed),
                Easing::EaseOutCubic,
                now_ms,
            );
        } else {
            self.driver.cancel();
            self.window_override = Some(target);
            self.stale = true;
        }
    }

    /// Stop everything in flight, keeping the committed progress.
    pub fn abort(&mut self) -> f64 {
        self.tracker.cancel();
        self.stale = false;
        self.driver.cancel()
    }

    /// Advance time. Returns the frame to render and mirror, if any.
    pub fn tick(&mut self, now_ms: f64) -> Option<Frame> {
        if let Some(tick) = self.driver.tick(now_ms) {
            if let Step::Bounds(bounds) = tick.step {
                self.window_override = Some(bounds);
            }
            if let Some(settle) = tick.finished {
                self.apply_settle(settle);
            }
            self.stale = false;
            let mut frame = self.current_frame();
            if tick.finished.is_some() {
                frame.resting = true;
                frame.settle = tick.finished;
            }
            return Some(frame);
        }

        if self.stale && !self.tracker.is_swiping() {
            self.stale = false;
            return Some(self.current_frame());
        }
        None
    }

    fn apply_settle(&mut self, settle: Settle) {
        match settle {
            Settle::Collapsed => {
                self.placeholder_width = None;
                self.window_override = None;
            }
            Settle::Expanded => self.placeholder_width = None,
            Settle::None => {}
        }
        tracing::debug!(?settle, progress = self.driver.progress(), "animation settled");
    }
}
