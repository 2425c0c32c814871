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

//! Command-line options understood by every Nova executable.
//!
//! Options override the config file, which overrides the defaults:
//!
//! ```text
//! sandbox --config game.ron --backend null --width 640 --no-vsync
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, EngineConfig, RendererBackend};

#[derive(Debug, Clone, Default, PartialEq, Parser)]
#[command(name = "nova", about = "Runs a Nova application")]
pub struct EngineArgs {
    /// RON config file. Takes precedence over `NOVA_CONFIG`.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Render system to drive.
    #[arg(short, long, value_enum)]
    pub backend: Option<RendererBackend>,
    /// Window width in pixels.
    #[arg(long)]
    pub width: Option<u32>,
    /// Window height in pixels.
    #[arg(long)]
    pub height: Option<u32>,
    /// Window title.
    #[arg(long)]
    pub title: Option<String>,
    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,
}

impl EngineArgs {
    /// Loads the config file these arguments select, applies the overrides
    /// and validates the result.
    pub fn resolve_config(&self) -> Result<EngineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::from_env_or_default()?,
        };
        config.apply_args(self);
        config.validate()?;
        Ok(config)
    }
}

impl EngineConfig {
    /// Overrides every field the arguments set.
    pub fn apply_args(&mut self, args: &EngineArgs) {
        if let Some(backend) = args.backend {
            self.renderer.backend = backend;
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(title) = &args.title {
            self.window.title.clone_from(title);
        }
        if args.no_vsync {
            self.renderer.vsync = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_change_nothing() {
        let args = EngineArgs::try_parse_from(["nova"]).unwrap();
        assert_eq!(args, EngineArgs::default());

        let mut config = EngineConfig::default();
        config.apply_args(&args);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let args = EngineArgs::try_parse_from([
            "nova",
            "--backend",
            "null",
            "--width",
            "640",
            "--height",
            "360",
            "--title",
            "Demo",
            "--no-vsync",
        ])
        .unwrap();

        let mut config = EngineConfig::default();
        config.apply_args(&args);

        assert_eq!(config.renderer.backend, RendererBackend::Null);
        assert_eq!((config.window.width, config.window.height), (640, 360));
        assert_eq!(config.window.title, "Demo");
        assert!(!config.renderer.vsync);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(EngineArgs::try_parse_from(["nova", "--backend", "vulkan"]).is_err());
    }

    #[test]
    fn test_arguments_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        std::fs::write(&path, r#"(window: (title: "From file", width: 800))"#).unwrap();
        let path_arg = path.to_string_lossy().into_owned();
        let args =
            EngineArgs::try_parse_from(["nova", "-c", path_arg.as_str(), "--width", "1024"])
                .unwrap();

        let config = args.resolve_config().unwrap();

        assert_eq!(config.window.title, "From file");
        assert_eq!(config.window.width, 1024);
    }

    #[test]
    fn test_resolved_config_is_validated() {
        let args = EngineArgs {
            config: Some(std::env::temp_dir().join("nova-cli-missing.ron")),
            ..EngineArgs::default()
        };
        assert!(matches!(args.resolve_config(), Err(ConfigError::Io { .. })));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        std::fs::write(&path, "()").unwrap();
        let args = EngineArgs {
            config: Some(path),
            width: Some(0),
            ..EngineArgs::default()
        };
        assert!(matches!(
            args.resolve_config(),
            Err(ConfigError::InvalidValue { field: "window", .. })
        ));
    }
}
