//! Persisted UI preferences
//!
//! Theme and locale survive restarts in `~/.appointly/preferences.toml`.
//! A missing or unreadable file never blocks startup; defaults are used.

use crate::config::appointly_home;
use crate::i18n::Locale;
use crate::theme::{DEFAULT_THEME, Theme};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub locale: Locale,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            locale: Locale::default(),
        }
    }
}

impl Preferences {
    pub fn default_path() -> PathBuf {
        appointly_home().join("preferences.toml")
    }

    /// Read preferences, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::read(path) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences {:?}: {:#}", path, e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse preferences")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize preferences")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write preferences: {:?}", path))?;
        tracing::debug!("Preferences saved to {:?}", path);
        Ok(())
    }

    /// Resolved theme; unknown ids map to the default
    pub fn theme(&self) -> Theme {
        Theme::by_id(&self.theme)
    }

    pub fn set_theme(&mut self, theme: &Theme, path: &Path) -> Result<()> {
        self.theme = theme.id.to_string();
        self.save(path)
    }

    pub fn set_locale(&mut self, locale: Locale, path: &Path) -> Result<()> {
        self.locale = locale;
        self.save(path)
    }
}
