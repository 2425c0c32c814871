// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration, loaded from RON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```ron
//! (
//!   window: (title: "My Game", width: 1920, height: 1080),
//!   renderer: (backend: Null),
//! )
//! ```

use std::path::{Path, PathBuf};

use nova_core::math::Color;
use nova_core::renderer::{RenderSettings, SwapchainBuffering, SwapchainConfig};
use nova_core::FrameClock;
use nova_infra::platform::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_TITLE, DEFAULT_WINDOW_WIDTH};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional config file.
pub const CONFIG_ENV_VAR: &str = "NOVA_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Which render system the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum RendererBackend {
    /// GPU rendering through wgpu.
    #[default]
    Wgpu,
    /// Headless bookkeeping device, nothing reaches the screen.
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_WINDOW_TITLE.to_string(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: RendererBackend,
    pub vsync: bool,
    pub buffering: SwapchainBuffering,
    /// Clear color used when the active scene has no camera.
    pub clear_color: Color,
    pub resize_debounce_ms: u64,
    pub resize_max_pending_frames: u32,
    pub wireframe: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            backend: RendererBackend::default(),
            vsync: true,
            buffering: SwapchainBuffering::default(),
            clear_color: Color::rgb(0.1, 0.1, 0.12),
            resize_debounce_ms: settings.resize_debounce_ms,
            resize_max_pending_frames: settings.resize_max_pending_frames,
            wireframe: settings.wireframe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Upper bound for one frame's delta, in seconds.
    pub max_delta: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            max_delta: FrameClock::DEFAULT_MAX_DELTA,
        }
    }
}

/// Everything the engine reads at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub time: TimeConfig,
}

impl EngineConfig {
    /// Reads and validates a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::de::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty_config)?)
    }

    /// Loads the file named by `NOVA_CONFIG`, or the defaults when it is unset.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window",
                reason: format!(
                    "size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        if !(self.time.max_delta.is_finite() && self.time.max_delta > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "time.max_delta",
                reason: format!("must be a positive number, got {}", self.time.max_delta),
            });
        }
        if self.renderer.resize_max_pending_frames == 0 {
            return Err(ConfigError::InvalidValue {
                field: "renderer.resize_max_pending_frames",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Swapchain request derived from the window and renderer sections.
    pub fn swapchain_config(&self) -> SwapchainConfig {
        SwapchainConfig {
            buffering: self.renderer.buffering,
            vsync: self.renderer.vsync,
            width: self.window.width,
            height: self.window.height,
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            resize_debounce_ms: self.renderer.resize_debounce_ms,
            resize_max_pending_frames: self.renderer.resize_max_pending_frames,
            wireframe: self.renderer.wireframe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_takes_defaults() {
        let config = EngineConfig::from_ron_str(
            r#"(window: (title: "Demo", width: 640), renderer: (backend: Null))"#,
        )
        .unwrap();
        assert_eq!(config.window.title, "Demo");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, DEFAULT_WINDOW_HEIGHT);
        assert_eq!(config.renderer.backend, RendererBackend::Null);
        assert!(config.renderer.vsync);
        assert_eq!(config.time, TimeConfig::default());
    }

    #[test]
    fn test_empty_text_is_the_default_config() {
        assert_eq!(EngineConfig::from_ron_str("()").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_ron_text_round_trips() {
        let mut config = EngineConfig::default();
        config.renderer.buffering = SwapchainBuffering::Double;
        config.renderer.clear_color = Color::new(0.25, 0.5, 0.75, 1.0);
        let text = config.to_ron_string().unwrap();
        assert_eq!(EngineConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        let err = EngineConfig::from_ron_str("(window: (width: \"wide\"))").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_window_size_is_rejected() {
        let err = EngineConfig::from_ron_str("(window: (height: 0))").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "window", .. }));
    }

    #[test]
    fn test_missing_file_reports_its_path() {
        let path = std::env::temp_dir().join("nova-config-that-does-not-exist.ron");
        match EngineConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reads_a_file() {
        let path = std::env::temp_dir().join(format!("nova-config-{}.ron", std::process::id()));
        std::fs::write(&path, "(time: (max_delta: 0.1))").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!((config.time.max_delta - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_derived_renderer_settings() {
        let config = EngineConfig::default();
        let swapchain = config.swapchain_config();
        assert_eq!((swapchain.width, swapchain.height), (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));
        assert_eq!(config.render_settings(), RenderSettings::default());
    }
}
