//! Startup configuration – `~/.costclear/config.toml` or `--config <path>`.
//!
//! ```toml
//! costmap_name = "local_costmap"
//! clearable_layers = ["obstacle_layer", "voxel_layer", "range_layer"]
//! layers = ["static_layer", "obstacle_layer", "voxel_layer", "inflation_layer"]
//!
//! [grid]
//! size_x = 100
//! size_y = 100
//! resolution = 0.05
//! origin_x = -2.5
//! origin_y = -2.5
//! default_value = 0
//!
//! [pose]
//! x = 0.0
//! y = 0.0
//! yaw = 0.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use costclear_types::Pose2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub size_x: u32,
    pub size_y: u32,
    /// Metres per cell.
    pub resolution: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    /// Reset value of every layer.
    pub default_value: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size_x: 100,
            size_y: 100,
            resolution: 0.05,
            origin_x: -2.5,
            origin_y: -2.5,
            default_value: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_costmap_name")]
    pub costmap_name: String,

    /// Trailing layer names that partial clears may touch.
    #[serde(default = "default_clearable_layers")]
    pub clearable_layers: Vec<String>,

    /// Layer stack, bottom first. Names are namespaced under `costmap_name`.
    #[serde(default = "default_layers")]
    pub layers: Vec<String>,

    #[serde(default)]
    pub grid: GridConfig,

    /// Initial robot pose.
    #[serde(default = "default_pose")]
    pub pose: Pose2,
}

fn default_costmap_name() -> String {
    "local_costmap".to_string()
}
fn default_clearable_layers() -> Vec<String> {
    ["obstacle_layer", "voxel_layer", "range_layer"]
        .map(String::from)
        .to_vec()
}
fn default_layers() -> Vec<String> {
    ["static_layer", "obstacle_layer", "voxel_layer", "inflation_layer"]
        .map(String::from)
        .to_vec()
}
fn default_pose() -> Pose2 {
    Pose2::new(0.0, 0.0, 0.0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            costmap_name: default_costmap_name(),
            clearable_layers: default_clearable_layers(),
            layers: default_layers(),
            grid: GridConfig::default(),
            pose: default_pose(),
        }
    }
}

/// `~/.costclear/config.toml`
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".costclear").join("config.toml")
}

/// Load the config at `path`, then apply environment overrides. `None` if
/// the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// | Variable | Config field |
/// |---|---|
/// | `COSTCLEAR_COSTMAP_NAME` | `costmap_name` |
/// | `COSTCLEAR_CLEARABLE_LAYERS` | `clearable_layers` (comma-separated) |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("COSTCLEAR_COSTMAP_NAME")
        && !v.trim().is_empty()
    {
        cfg.costmap_name = v.trim().to_string();
    }
    if let Some(v) = lookup("COSTCLEAR_CLEARABLE_LAYERS") {
        cfg.clearable_layers = parse_layer_list(&v);
    }
}

fn parse_layer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Write `cfg` to `path`, creating parent directories.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let raw = toml::to_string_pretty(cfg)?;
    fs::write(path, raw).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
