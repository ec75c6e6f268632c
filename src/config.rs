// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub player: PlayerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub desktop: SearchProfile,
    pub mobile: SearchProfile,
}

/// Tunables for one search input. The desktop and mobile inputs share the
/// same client and differ only in these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProfile {
    /// Name of the dropdown the results are painted into.
    pub target: String,
    pub min_query_len: usize,
    /// Minimum length for Enter to bypass the debounce.
    pub submit_min_len: usize,
    pub result_limit: usize,
    pub debounce_ms: u64,
}

impl SearchProfile {
    pub fn desktop() -> Self {
        Self {
            target: "search-results".to_string(),
            min_query_len: 2,
            submit_min_len: 1,
            result_limit: 8,
            debounce_ms: 500,
        }
    }

    pub fn mobile() -> Self {
        Self {
            target: "mobile-search-results".to_string(),
            min_query_len: 2,
            submit_min_len: 2,
            result_limit: 8,
            debounce_ms: 500,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub recent_limit: usize,
    pub recommendation_limit: usize,
    pub default_theme: String,
    pub notice_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                image_base_url: "https://image.tmdb.org/t/p".to_string(),
                timeout_secs: 30,
            },
            search: SearchConfig {
                desktop: SearchProfile::desktop(),
                mobile: SearchProfile::mobile(),
            },
            player: PlayerConfig {
                command: "mpv".to_string(),
                args: vec!["--fs".to_string(), "--quiet".to_string()],
            },
            ui: UiConfig {
                recent_limit: 16,
                recommendation_limit: 16,
                default_theme: "red".to_string(),
                notice_secs: 3,
            },
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("strix").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Could not load config file, using defaults: {:#}", e);
            Self::default()
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.ui.notice_secs)
    }
}
