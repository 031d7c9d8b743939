//! Configuration types, defaults, loading, and validation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Booking backend endpoint
    #[serde(default)]
    pub api: ApiConfig,

    /// Wizard timing and validation rules
    #[serde(default)]
    pub booking: BookingConfig,

    /// Landing page content
    #[serde(default)]
    pub business: BusinessConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Booking backend endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the callable functions, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5001/booking-app/us-central1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Wizard timing and validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Digits in the verification code
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,

    /// Seconds before a code may be re-sent
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_secs: u32,

    /// Delay between "Verified!" and the confirmation screen
    #[serde(default = "default_success_delay")]
    pub success_delay_ms: u64,

    /// Length of the shake shown on a wrong code
    #[serde(default = "default_shake_ms")]
    pub shake_ms: u64,

    /// Delay before the code cells are cleared after a failure
    #[serde(default = "default_otp_reset_delay")]
    pub otp_reset_delay_ms: u64,

    /// Lifetime of an error toast
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,

    /// Required leading digits of the phone number
    #[serde(default = "default_phone_prefix")]
    pub phone_prefix: String,

    /// Exact number of digits in a phone number
    #[serde(default = "default_phone_digits")]
    pub phone_digits: usize,
}

fn default_otp_length() -> usize {
    4
}

fn default_resend_cooldown() -> u32 {
    60
}

fn default_success_delay() -> u64 {
    1500
}

fn default_shake_ms() -> u64 {
    500
}

fn default_otp_reset_delay() -> u64 {
    300
}

fn default_toast_secs() -> u64 {
    5
}

fn default_phone_prefix() -> String {
    "05".to_string()
}

fn default_phone_digits() -> usize {
    10
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            otp_length: default_otp_length(),
            resend_cooldown_secs: default_resend_cooldown(),
            success_delay_ms: default_success_delay(),
            shake_ms: default_shake_ms(),
            otp_reset_delay_ms: default_otp_reset_delay(),
            toast_secs: default_toast_secs(),
            phone_prefix: default_phone_prefix(),
            phone_digits: default_phone_digits(),
        }
    }
}

/// Business shown on the landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(default = "default_business_name")]
    pub name: String,

    #[serde(default = "default_tagline")]
    pub tagline: String,

    /// Short selling points, one per line
    #[serde(default = "default_highlights")]
    pub highlights: Vec<String>,

    #[serde(default)]
    pub address: Option<String>,

    /// Free-form opening hours lines, e.g. "Sun-Thu 09:00-19:00"
    #[serde(default = "default_hours")]
    pub hours: Vec<String>,
}

fn default_business_name() -> String {
    "Appointly Studio".to_string()
}

fn default_tagline() -> String {
    "Book your next appointment in under a minute".to_string()
}

fn default_highlights() -> Vec<String> {
    vec![
        "Pick a service, a day and a time".to_string(),
        "Verify with a WhatsApp code, no account needed".to_string(),
        "Confirmation straight to your phone".to_string(),
    ]
}

fn default_hours() -> Vec<String> {
    vec![
        "Sun-Thu 09:00-19:00".to_string(),
        "Fri 09:00-14:00".to_string(),
    ]
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            tagline: default_tagline(),
            highlights: default_highlights(),
            address: None,
            hours: default_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory override
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Canonical base directory: `~/.appointly/`
///
/// Config, preferences and logs live here.
pub fn appointly_home() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let p = home.join(".appointly");
    if !p.exists() {
        let _ = std::fs::create_dir_all(&p);
    }
    p
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.appointly/config.toml
    /// 3. Local config: ./appointly.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut layers = Vec::new();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            layers.push(system_config_path);
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            layers.push(local_config_path);
        }

        let config = Self::from_layers(&layers)?;
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Custom config file (specified path)
    /// 3. Environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }

        let config = Self::from_layers(&[path.to_path_buf()])?;
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// Get the system config path: ~/.appointly/config.toml
    pub fn system_config_path() -> PathBuf {
        appointly_home().join("config.toml")
    }

    /// Get the local config path: ./appointly.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./appointly.toml")
    }

    /// Merge TOML files key by key, later files winning, then fill defaults.
    fn from_layers(paths: &[PathBuf]) -> Result<Self> {
        let mut doc = toml::Value::Table(toml::map::Map::new());
        for path in paths {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let layer: toml::Value = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            merge_values(&mut doc, layer);
        }

        doc.try_into().context("Invalid configuration")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: Self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = var("APPOINTLY_API_URL") {
            config.api.base_url = base_url;
        }

        if let Some(log_level) = var("APPOINTLY_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Some(log_file) = var("APPOINTLY_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(log_file));
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("api.base_url must be an http(s) URL, got {:?}", url);
        }

        if !(4..=8).contains(&self.booking.otp_length) {
            anyhow::bail!(
                "booking.otp_length must be between 4 and 8, got {}",
                self.booking.otp_length
            );
        }

        if self.booking.resend_cooldown_secs == 0 {
            anyhow::bail!("booking.resend_cooldown_secs must be positive");
        }

        let prefix = &self.booking.phone_prefix;
        if !prefix.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("booking.phone_prefix must contain only digits, got {:?}", prefix);
        }
        if prefix.len() >= self.booking.phone_digits {
            anyhow::bail!(
                "booking.phone_digits ({}) must be longer than phone_prefix {:?}",
                self.booking.phone_digits,
                prefix
            );
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Rotate config backups before writing.
    ///
    /// Keeps up to `max_backups` copies named `config.toml.backup1` (newest)
    /// through `config.toml.backupN` (oldest). Errors are logged and ignored.
    fn backup_config(path: &Path, max_backups: usize) {
        if !path.exists() {
            return;
        }

        let Some(parent) = path.parent() else {
            return;
        };
        let stem = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // N → N+1, oldest dropped
        for i in (1..=max_backups).rev() {
            let src = parent.join(format!("{stem}.backup{i}"));
            if i == max_backups {
                let _ = fs::remove_file(&src);
            } else {
                let dst = parent.join(format!("{stem}.backup{}", i + 1));
                if src.exists() {
                    let _ = fs::rename(&src, &dst);
                }
            }
        }

        let backup1 = parent.join(format!("{stem}.backup1"));
        if let Err(e) = fs::copy(path, &backup1) {
            tracing::warn!("Failed to back up config before write: {e}");
        } else {
            tracing::debug!("Config backed up to {}", backup1.display());
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        Self::backup_config(path, 5);

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}

/// Recursive table merge; non-table values in `overlay` replace `base`.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_toml(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.booking.otp_length, 4);
        assert_eq!(config.booking.resend_cooldown_secs, 60);
        assert_eq!(config.booking.phone_prefix, "05");
        assert_eq!(config.booking.phone_digits, 10);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_phone_rules() {
        let mut config = Config::default();
        config.booking.phone_prefix = "0a".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.booking.phone_digits = 2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.booking.otp_length = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml_partial_sections() {
        let toml_content = r#"
[api]
base_url = "https://europe-west1-salon.cloudfunctions.net"

[booking]
otp_length = 6

[business]
name = "Noa's Nails"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.api.base_url,
            "https://europe-west1-salon.cloudfunctions.net"
        );
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.booking.otp_length, 6);
        assert_eq!(config.booking.resend_cooldown_secs, 60);
        assert_eq!(config.business.name, "Noa's Nails");
        assert!(!config.business.hours.is_empty());
    }

    #[test]
    fn test_layers_merge_field_by_field() {
        let dir = TempDir::new().unwrap();
        let system = write_toml(
            &dir,
            "system.toml",
            "[api]\nbase_url = \"https://a.example\"\ntimeout_secs = 5\n[logging]\nlevel = \"warn\"\n",
        );
        let local = write_toml(&dir, "local.toml", "[api]\ntimeout_secs = 12\n");

        let config = Config::from_layers(&[system, local]).unwrap();

        assert_eq!(config.api.base_url, "https://a.example");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = TempDir::new().unwrap();
        let bad = write_toml(&dir, "bad.toml", "[api\nbase_url = ");
        let err = Config::from_layers(&[bad]).unwrap_err();
        assert!(format!("{:#}", err).contains("bad.toml"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_path(dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::apply_env_overrides(Config::default(), |key| match key {
            "APPOINTLY_API_URL" => Some("https://prod.example".to_string()),
            "APPOINTLY_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://prod.example");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.business.address = Some("12 Herzl St".to_string());

        config.save(temp_file.path()).unwrap();

        let loaded = Config::from_layers(&[temp_file.path().to_path_buf()]).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_rotates_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        Config::default().save(&path).unwrap();
        assert!(!dir.path().join("config.toml.backup1").exists());

        Config::default().save(&path).unwrap();
        Config::default().save(&path).unwrap();
        assert!(dir.path().join("config.toml.backup1").exists());
        assert!(dir.path().join("config.toml.backup2").exists());
    }
}
