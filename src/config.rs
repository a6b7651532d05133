// Copyright 2025 dentsusoken
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

use crate::error::{PlatformError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const HOME_ENV: &str = "CNQUERY_HOME";
const ENV_PREFIX: &str = "CNQUERY";
const DEFAULT_HOME_DIR: &str = ".cnquery";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DetectionConfig {
    #[serde(default)]
    pub detection: DetectionSettings,

    #[serde(default)]
    pub local: LocalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionSettings {
    /// Resolve the local machine once per process and share the result
    /// between all detectors of local transports.
    #[serde(default = "default_share_local_detection")]
    pub share_local_detection: bool,

    /// Keep the resolved platform per detector instance.
    #[serde(default = "default_memoize")]
    pub memoize: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            share_local_detection: default_share_local_detection(),
            memoize: default_memoize(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalSettings {
    /// Program and leading arguments used to run probe commands locally.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

fn default_share_local_detection() -> bool {
    // PowerShell start-up dominates local detection on Windows
    cfg!(windows)
}

fn default_memoize() -> bool {
    true
}

pub fn default_shell() -> Vec<String> {
    if cfg!(windows) {
        vec![
            "powershell".to_string(),
            "-NoProfile".to_string(),
            "-Command".to_string(),
        ]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}

/// Locate the cnquery home directory (`$CNQUERY_HOME` or `~/.cnquery`)
pub fn cnquery_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| PlatformError::ConfigError("Unable to determine home directory".to_string()))
}

/// Load the configuration from the cnquery home directory.
pub fn new_detection_config() -> Result<DetectionConfig> {
    DetectionConfig::load(&cnquery_home()?)
}

impl DetectionConfig {
    /// Load `config.toml` from `home`, then apply `CNQUERY_*` environment
    /// overrides (e.g. `CNQUERY_DETECTION__SHARE_LOCAL_DETECTION=true`).
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(config_path.clone()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: DetectionConfig = settings.try_deserialize()?;
        config.validate()?;

        log::debug!("Loaded detection config from {config_path:?}");
        Ok(config)
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let config_path = home.join(CONFIG_FILE_NAME);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| PlatformError::ConfigError(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, contents)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match self.local.shell.first() {
            Some(program) if !program.trim().is_empty() => Ok(()),
            _ => Err(PlatformError::InvalidConfig(
                "local.shell must name a program".to_string(),
            )),
        }
    }
}
