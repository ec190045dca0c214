// src/config.rs

//! Runtime configuration for the `softframe` binary.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the keys it
//! wants to change. Colors are written as `#RRGGBB`, `#RRGGBBAA` or a palette name;
//! window flags use the bitflags text form, e.g. `"HIDDEN | BORDERLESS"`.

use crate::color::{Color, NamedColor};
use crate::display::WindowFlags;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "SOFTFRAME_CONFIG";

/// Process-wide configuration, resolved from the environment on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub run: RunConfig,
}

impl Config {
    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads the file named by `SOFTFRAME_CONFIG`, or the defaults when it is unset,
    /// unreadable or malformed.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(&path).unwrap_or_else(|e| {
                warn!("Config: {}; using defaults", e);
                Self::default()
            }),
            None => {
                info!("Config: {} not set, using defaults", CONFIG_ENV_VAR);
                Self::default()
            }
        }
    }
}

// --- Window Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u16,
    pub height: u16,
    /// Creation hints forwarded to the display driver.
    pub flags: WindowFlags,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "softframe".to_string(),
            width: 800,
            height: 600,
            flags: WindowFlags::empty(),
        }
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Color the framebuffer is reset to at the start of every frame.
    pub clear_color: Color,
    /// Box blur applied after drawing. `None` skips the pass.
    pub blur_radius: Option<u16>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            clear_color: NamedColor::Black.to_color(),
            blur_radius: None,
        }
    }
}

// --- Run Loop Configuration ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop after this many frames. `None` runs until the window is closed.
    pub max_frames: Option<u64>,
    /// Sleep between frames.
    pub frame_interval_ms: u64,
    pub log_frame_timings: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_frames: None,
            frame_interval_ms: 16,
            log_frame_timings: false,
        }
    }
}
