//! Edgebar configuration.
//!
//! The configuration document lives at `<data_dir>/config.json`. It is owned
//! by the settings UI; edgebar only reads it. Every field is optional and a
//! malformed value falls back to its default without rejecting the rest of
//! the document. Only a syntactically broken file is an error.
//!
//! ```json
//! {
//!   "transforms": {
//!     "display": 0, "height": 120, "posy": 400, "size": 100,
//!     "animation_speed": 1,
//!     "panel": { "width": 450, "height": 400, "opacity": 0.9 }
//!   },
//!   "widgets": [],
//!   "automatic": [ { "script": "backup.ps1", "args": ["-q"], "on": ["shutdown"] } ],
//!   "behavior": { "log_level": "info", "blacklist": [], "conflicting_software": [] }
//! }
//! ```

mod lenient;

use directories::ProjectDirs;
use edgebar_core_motion::GeometryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for the data directory.
pub const APP_NAME: &str = "edgebar";
/// File name of the configuration document inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PANEL_WIDTH: f64 = 450.0;
pub const DEFAULT_PANEL_HEIGHT: f64 = 400.0;
pub const DEFAULT_PANEL_OPACITY: f64 = 0.9;
pub const DEFAULT_SIZE_PERCENT: f64 = 100.0;
pub const DEFAULT_ANIMATION_SPEED: f64 = 1.0;
pub const DEFAULT_COLLAPSED_HEIGHT: f64 = 120.0;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geometry of the bar and panel.
    #[serde(deserialize_with = "lenient::or_default")]
    pub transforms: Transforms,
    /// Widget definitions, passed through to the renderer untouched.
    #[serde(deserialize_with = "lenient::list")]
    pub widgets: Vec<serde_json::Value>,
    /// Scripts bound to lifecycle triggers.
    #[serde(deserialize_with = "lenient::list")]
    pub automatic: Vec<AutomationTask>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub behavior: BehaviorConfig,
}

/// The `transforms` block. Raw values; use the accessors for resolved ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transforms {
    /// Index of the display the bar lives on.
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub display: Option<f64>,
    /// Collapsed pill height.
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Vertical center offset from the work area top.
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub posy: Option<f64>,
    /// Global scale in percent.
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub animation_speed: Option<f64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub panel: PanelTransform,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelTransform {
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(default)
}

impl PanelTransform {
    pub fn width(&self) -> f64 {
        positive_or(self.width, DEFAULT_PANEL_WIDTH)
    }

    pub fn height(&self) -> f64 {
        positive_or(self.height, DEFAULT_PANEL_HEIGHT)
    }

    /// Opacity clamped to `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.opacity.map_or(DEFAULT_PANEL_OPACITY, |o| o.clamp(0.0, 1.0))
    }
}

impl Transforms {
    /// Display index; negative values are kept so the resolver falls back.
    pub fn display_index(&self) -> i64 {
        self.display.map_or(0, |d| d.trunc() as i64)
    }

    pub fn collapsed_height(&self) -> f64 {
        positive_or(self.height, DEFAULT_COLLAPSED_HEIGHT)
    }

    /// Scale factor (`size / 100`). Non-positive sizes count as 100%.
    pub fn scale(&self) -> f64 {
        positive_or(self.size, DEFAULT_SIZE_PERCENT) / 100.0
    }

    /// Animation speed multiplier. Non-positive values count as 1.
    pub fn animation_speed(&self) -> f64 {
        positive_or(self.animation_speed, DEFAULT_ANIMATION_SPEED)
    }

    /// Geometry parameters for the motion engine.
    pub fn geometry(&self) -> GeometryConfig {
        GeometryConfig {
            scale: self.scale(),
            collapsed_height: self.collapsed_height(),
            posy: self.posy,
            panel_width: self.panel.width(),
            panel_height: self.panel.height(),
            panel_opacity: self.panel.opacity(),
        }
    }
}

/// Lifecycle event an automation task is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Startup,
    Shutdown,
    /// A trigger this version does not know about.
    #[serde(other)]
    Other,
}

/// A script or URI to launch on a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationTask {
    /// Script path (relative paths resolve against the data directory) or URI.
    pub script: String,
    #[serde(default, deserialize_with = "lenient::words")]
    pub args: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub on: Vec<Trigger>,
}

impl AutomationTask {
    pub fn runs_on(&self, trigger: Trigger) -> bool {
        self.on.contains(&trigger)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(deserialize_with = "lenient::string")]
    pub log_level: Option<String>,
    /// Window titles or executables never treated as "last window".
    #[serde(deserialize_with = "lenient::words")]
    pub blacklist: Vec<String>,
    /// Window title keywords of software that fights the sidebar.
    #[serde(deserialize_with = "lenient::words")]
    pub conflicting_software: Vec<String>,
    /// Length of the foreground history.
    #[serde(deserialize_with = "lenient::number")]
    pub history_limit: Option<f64>,
}

impl BehaviorConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
            .filter(|n| *n >= 1.0)
            .map_or(DEFAULT_HISTORY_LIMIT, |n| n as usize)
    }
}

impl Config {
    /// Parse a document from JSON text.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load `<data_dir>/config.json`, or defaults if the file does not exist.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_path(data_dir);
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        tracing::info!("Loading config from: {}", path.display());
        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Tasks bound to `trigger`, in document order.
    pub fn tasks_for(&self, trigger: Trigger) -> impl Iterator<Item = &AutomationTask> {
        self.automatic.iter().filter(move |t| t.runs_on(trigger))
    }
}

/// Resolve the data directory: explicit path, then the platform data
/// directory, then `./data`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Directory for durable log files.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
