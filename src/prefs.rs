// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::view::{Paint, Surface};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const THEMES: [&str; 5] = ["red", "blue", "green", "purple", "orange"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefsData {
    theme: String,
}

/// Manages the theme preference stored in the data directory
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    default_theme: String,
}

impl ThemeStore {
    pub fn new<P: AsRef<Path>>(path: P, default_theme: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_theme: default_theme.to_string(),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join("strix").join("prefs.json"))
            .unwrap_or_else(|| PathBuf::from("prefs.json"))
    }

    /// Saved theme, or the default when nothing usable is stored
    pub fn load(&self) -> String {
        if !self.path.exists() {
            return self.default_theme.clone();
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read prefs file: {}", self.path.display()))
            .and_then(|content| {
                serde_json::from_str::<PrefsData>(&content)
                    .with_context(|| "Failed to parse prefs JSON")
            });

        match data {
            Ok(data) if is_known(&data.theme) => data.theme,
            Ok(data) => {
                warn!("Ignoring unknown saved theme '{}'", data.theme);
                self.default_theme.clone()
            }
            Err(e) => {
                warn!("{:#}", e);
                self.default_theme.clone()
            }
        }
    }

    pub fn save(&self, theme: &str) -> Result<()> {
        let theme = theme.trim().to_lowercase();
        if !is_known(&theme) {
            bail!("Unknown theme '{}', expected one of: {}", theme, THEMES.join(", "));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create prefs directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(&PrefsData { theme })
            .with_context(|| "Failed to serialize prefs")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write prefs file: {}", self.path.display()))?;

        Ok(())
    }

    /// Reads the saved theme and paints it.
    pub fn apply(&self, surface: &dyn Surface) -> String {
        let theme = self.load();
        surface.paint(Paint::Theme(theme.clone()));
        theme
    }

    /// Saves and paints a newly picked theme.
    pub fn select(&self, theme: &str, surface: &dyn Surface) -> Result<()> {
        self.save(theme)?;
        surface.paint(Paint::Theme(theme.trim().to_lowercase()));
        Ok(())
    }
}

fn is_known(theme: &str) -> bool {
    THEMES.contains(&theme)
}

/// Theme after `current` in the picker order.
pub fn next_theme(current: &str) -> &'static str {
    let index = THEMES.iter().position(|t| *t == current).map_or(0, |i| i + 1);
    THEMES[index % THEMES.len()]
}
