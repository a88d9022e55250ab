//! Resting state decision for a released swipe.

use crate::gesture::GestureSummary;
use serde::{Deserialize, Serialize};

/// Terminal state chosen for a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Expand,
    Collapse,
}

impl Decision {
    /// Progress the panel settles at.
    pub fn target(&self) -> f64 {
        match self {
            Decision::Expand => 1.0,
            Decision::Collapse => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Travel (px) that always expands.
    pub distance: f64,
    /// Velocity (px/ms) above which the panel expands.
    pub expand_velocity: f64,
    /// Velocity (px/ms) below which the panel collapses. Negative.
    pub collapse_velocity: f64,
    /// Upper bound (ms) of a quick flick.
    pub quick_flick_ms: f64,
    /// Travel (px) a quick flick needs.
    pub quick_flick_distance: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            distance: 60.0,
            expand_velocity: 0.5,
            collapse_velocity: -0.5,
            quick_flick_ms: 200.0,
            quick_flick_distance: 20.0,
        }
    }
}

/// Pick the resting state of a released swipe. First match wins:
///
/// 1. a fast collapse-direction flick collapses
/// 2. enough travel, enough speed, or a short quick flick expands
/// 3. everything else collapses
pub fn decide(summary: &GestureSummary, thresholds: &DecisionThresholds) -> Decision {
    if summary.velocity < thresholds.collapse_velocity {
        return Decision::Collapse;
    }

    let far_enough = summary.delta_x >= thresholds.distance;
    let fast_enough = summary.velocity > thresholds.expand_velocity;
    let quick_flick =
        summary.elapsed_ms < thresholds.quick_flick_ms && summary.delta_x >= thresholds.quick_flick_distance;

    if far_enough || fast_enough || quick_flick {
        Decision::Expand
    } else {
        Decision::Collapse
    }
}
