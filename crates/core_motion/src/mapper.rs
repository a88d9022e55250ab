//! Progress-to-geometry mapping.
//!
//! The panel box is in logical pixels (before the user scale factor), the
//! host window is in physical screen pixels. The window is always derived
//! from the panel box actually rendered at the given progress, so
//! intermediate frames never clip the panel or its shadow.

use crate::display::{clamp_axis, clamp_rect};
use crate::{clamp_progress, lerp, Rect};
use serde::{Deserialize, Serialize};

/// Width of the host window while collapsed (logical px).
pub const COLLAPSED_WINDOW_WIDTH: f64 = 20.0;
/// Extra height added around the collapsed pill (logical px).
pub const WINDOW_CHROME: f64 = 30.0;
/// Visual width of the collapsed pill (logical px).
pub const PILL_WIDTH: f64 = 8.0;
/// Room kept around the panel so shadows are not clipped (logical px).
pub const WINDOW_MARGIN: f64 = 40.0;
/// Minimum distance between the expanded window and the work area edges.
pub const EDGE_INSET: f64 = 20.0;
/// Minimum interval between two intermediate geometry applications.
pub const APPLY_INTERVAL_MS: f64 = 16.0;

const RADIUS_RANGE: (f64, f64) = (4.0, 16.0);
const MARGIN_RANGE: (f64, f64) = (6.0, 12.0);
const COLLAPSED_ALPHA: f64 = 0.6;

/// Geometry-relevant subset of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Global scale factor (`size / 100`).
    pub scale: f64,
    /// Height of the collapsed pill (logical px).
    pub collapsed_height: f64,
    /// Vertical center offset from the work area top. `None` centers the bar.
    pub posy: Option<f64>,
    /// Expanded panel width (logical px).
    pub panel_width: f64,
    /// Expanded panel height (logical px).
    pub panel_height: f64,
    /// Expanded panel background opacity.
    pub panel_opacity: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            collapsed_height: 120.0,
            posy: None,
            panel_width: 450.0,
            panel_height: 400.0,
            panel_opacity: 0.9,
        }
    }
}

/// Visual box of the widget surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelBox {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub margin_left: f64,
    pub background_alpha: f64,
}

/// Output of [`map_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub progress: f64,
    pub panel: PanelBox,
    pub window: Rect,
}

impl Geometry {
    /// Whether the geometry is one of the two resting states.
    pub fn is_resting(&self) -> bool {
        self.progress <= 0.0 || self.progress >= 1.0
    }
}

/// Panel box at the given progress.
pub fn panel_box(progress: f64, config: &GeometryConfig) -> PanelBox {
    let p = clamp_progress(progress);
    PanelBox {
        width: lerp(PILL_WIDTH, config.panel_width, p),
        height: lerp(config.collapsed_height, config.panel_height, p),
        radius: lerp(RADIUS_RANGE.0, RADIUS_RANGE.1, p),
        margin_left: lerp(MARGIN_RANGE.0, MARGIN_RANGE.1, p),
        background_alpha: lerp(COLLAPSED_ALPHA, config.panel_opacity, p),
    }
}

/// Physical size of the collapsed host window. Truncates toward zero.
pub fn collapsed_window_size(config: &GeometryConfig) -> (i32, i32) {
    (
        (COLLAPSED_WINDOW_WIDTH * config.scale) as i32,
        ((config.collapsed_height + WINDOW_CHROME) * config.scale) as i32,
    )
}

/// Physical size of the host window needed to contain `panel`.
fn window_size(progress: f64, panel: &PanelBox, config: &GeometryConfig) -> (i32, i32) {
    let (min_width, min_height) = collapsed_window_size(config);
    if progress <= 0.0 {
        return (min_width, min_height);
    }
    let width = ((panel.margin_left + panel.width + WINDOW_MARGIN) * config.scale).ceil() as i32;
    let height = ((panel.height + WINDOW_MARGIN) * config.scale).ceil() as i32;
    (width.max(min_width), height.max(min_height))
}

/// Requested vertical center of the bar in screen coordinates.
pub fn anchor_center(config: &GeometryConfig, work_area: Rect) -> f64 {
    let offset = config.posy.unwrap_or(work_area.height as f64 / 2.0);
    work_area.y as f64 + offset
}

/// Center the window at `center_y`, clamped to stay inside the work area.
pub fn place_vertically(center_y: f64, height: i32, work_area: Rect) -> i32 {
    let desired = (center_y - height as f64 / 2.0).round() as i32;
    clamp_axis(desired, height, work_area.y, work_area.height)
}

/// Center at which the fully expanded window keeps [`EDGE_INSET`] from both edges.
fn safe_center(center: f64, expanded_height: i32, work_area: Rect) -> f64 {
    let half = expanded_height as f64 / 2.0;
    let top = work_area.y as f64 + EDGE_INSET + half;
    let bottom = work_area.bottom() as f64 - EDGE_INSET - half;
    if top > bottom {
        work_area.y as f64 + work_area.height as f64 / 2.0
    } else {
        center.clamp(top, bottom)
    }
}

/// Map expansion progress to the panel box and host window bounds.
///
/// The vertical center glides from the requested anchor towards the safe
/// center as progress grows, so the expanded window never crosses the work
/// area edges and never jumps.
pub fn map_progress(progress: f64, config: &GeometryConfig, work_area: Rect) -> Geometry {
    let p = clamp_progress(progress);
    let panel = panel_box(p, config);
    let (width, height) = window_size(p, &panel, config);

    let expanded = panel_box(1.0, config);
    let (_, expanded_height) = window_size(1.0, &expanded, config);
    let anchor = anchor_center(config, work_area);
    let center = lerp(anchor, safe_center(anchor, expanded_height, work_area), p);

    let window = clamp_rect(
        Rect::new(work_area.x, place_vertically(center, height, work_area), width, height),
        work_area,
    );

    Geometry { progress: p, panel, window }
}

/// Rate limiter for cross-process window resizes.
///
/// Resting frames always pass so the window lands exactly on its final
/// bounds; intermediate frames pass at most once per interval.
#[derive(Debug, Clone)]
pub struct ApplyThrottle {
    interval_ms: f64,
    last_applied_ms: Option<f64>,
}

impl Default for ApplyThrottle {
    fn default() -> Self {
        Self::new(APPLY_INTERVAL_MS)
    }
}

impl ApplyThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_applied_ms: None,
        }
    }

    /// Decide whether a frame computed at `now_ms` should be applied.
    pub fn admit(&mut self, now_ms: f64, resting: bool) -> bool {
        let due = self
            .last_applied_ms
            .map_or(true, |last| now_ms - last >= self.interval_ms);
        if resting || due {
            self.last_applied_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    /// Forget the last application so the next frame passes.
    pub fn reset(&mut self) {
        self.last_applied_ms = None;
    }
}
