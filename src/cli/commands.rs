//! CLI subcommands: services, slots, theme, locale, config, init, logs, and config loading.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::api::{BookingApi, HttpBookingClient};
use crate::config::Config;
use crate::i18n::{self, Locale, Text, t};
use crate::preferences::Preferences;
use crate::theme::{THEMES, Theme};
use crate::wizard::group_by_period;

use super::LogCommands;

/// Load configuration from file or defaults
pub async fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    config.validate()?;

    Ok(config)
}

fn parse_locale(code: &str) -> Result<Locale> {
    Locale::from_code(code).with_context(|| {
        let known: Vec<&str> = Locale::ALL.iter().map(|l| l.code()).collect();
        format!("Unknown language {:?}. Available: {}", code, known.join(", "))
    })
}

/// List active services
pub(crate) async fn cmd_services(config: &Config, locale: Option<&str>) -> Result<()> {
    let locale = match locale {
        Some(code) => parse_locale(code)?,
        None => Preferences::load(&Preferences::default_path()).locale,
    };

    let client = HttpBookingClient::new(&config.api).context("Failed to create API client")?;
    let services = client
        .get_services()
        .await
        .context("Failed to load services")?;

    let active: Vec<_> = services.into_iter().filter(|s| s.active).collect();
    if active.is_empty() {
        println!("No services are currently available.");
        return Ok(());
    }

    println!("{}\n", t(locale, Text::SelectService));
    for service in &active {
        println!(
            "  {:<16} {:<32} {:>4} {} · ₪{}",
            service.id,
            service.name(locale),
            service.duration,
            t(locale, Text::Minutes),
            service.price
        );
        if let Some(desc) = service.description(locale) {
            println!("  {:<16} {}", "", desc);
        }
    }

    Ok(())
}

/// List open start times for a service on a date
pub(crate) async fn cmd_slots(config: &Config, service_id: &str, date: &str) -> Result<()> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", date))?;
    let locale = Preferences::load(&Preferences::default_path()).locale;

    let client = HttpBookingClient::new(&config.api).context("Failed to create API client")?;
    let slots = client
        .get_available_time_slots(date, service_id)
        .await
        .context("Failed to load time slots")?;

    println!("{}\n", i18n::format_date_localized(date, locale));
    if slots.is_empty() {
        println!("{}", t(locale, Text::NoAvailableTimes));
        println!("{}", t(locale, Text::TryAnotherDate));
        return Ok(());
    }

    for group in group_by_period(&slots) {
        let times: Vec<&str> = group.slots.iter().map(|(_, slot)| *slot).collect();
        println!("  {:<10} {}", t(locale, group.period.label()), times.join("  "));
    }

    Ok(())
}

/// Show themes, or persist the selected one
pub(crate) fn cmd_theme(id: Option<&str>) -> Result<()> {
    let path = Preferences::default_path();
    let mut prefs = Preferences::load(&path);

    let Some(id) = id else {
        let current = prefs.theme();
        for theme in THEMES {
            let marker = if theme.id == current.id { "*" } else { " " };
            let kind = if theme.is_dark() { "dark" } else { "light" };
            println!("{} {:<12} {:<14} {}", marker, theme.id, theme.name, kind);
        }
        return Ok(());
    };

    let theme = Theme::find(id).with_context(|| {
        let known: Vec<&str> = THEMES.iter().map(|t| t.id).collect();
        format!("Unknown theme {:?}. Available: {}", id, known.join(", "))
    })?;
    prefs.set_theme(&theme, &path)?;
    println!("Theme set to {}", theme.name);
    Ok(())
}

/// Show languages, or persist the selected one
pub(crate) fn cmd_locale(code: Option<&str>) -> Result<()> {
    let path = Preferences::default_path();
    let mut prefs = Preferences::load(&path);

    let Some(code) = code else {
        for locale in Locale::ALL {
            let marker = if locale == prefs.locale { "*" } else { " " };
            println!(
                "{} {:<4} {:<10} {}",
                marker,
                locale.code(),
                locale.english_name(),
                locale.native_name()
            );
        }
        return Ok(());
    };

    let locale = parse_locale(code)?;
    prefs.set_locale(locale, &path)?;
    println!("Language set to {}", locale.english_name());
    Ok(())
}

/// Print the effective configuration as TOML
pub(crate) fn cmd_config(config: &Config) -> Result<()> {
    println!("# System config: {}\n", Config::system_config_path().display());
    let rendered = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", rendered);
    Ok(())
}

/// Write a default configuration file
pub(crate) fn cmd_init(force: bool) -> Result<()> {
    println!("Appointly Configuration Initialization\n");

    let config_path = Config::system_config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("Configuration initialized at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set [api].base_url to your booking backend");
    println!("   2. Fill in [business] for the landing page");
    println!("   3. Run 'appointly' to start booking");

    Ok(())
}

/// Log file operations
pub(crate) fn cmd_logs(operation: LogCommands) -> Result<()> {
    use crate::logging;
    use std::io::{BufRead, BufReader};

    let log_dir = logging::log_dir();

    match operation {
        LogCommands::Status => {
            println!("Appointly Logging Status\n");
            println!("Log directory: {}", log_dir.display());

            let files: Vec<_> = std::fs::read_dir(&log_dir)
                .map(|entries| entries.filter_map(|e| e.ok()).collect())
                .unwrap_or_default();
            if files.is_empty() {
                println!("Status: no logs found");
                return Ok(());
            }

            let total_size: u64 = files
                .iter()
                .filter_map(|e| e.metadata().ok())
                .map(|m| m.len())
                .sum();
            println!("Log files: {}", files.len());
            println!("Total size: {:.2} MB", total_size as f64 / (1024.0 * 1024.0));
            if let Some(latest) = logging::get_log_path() {
                println!("Latest log: {}", latest.display());
            }
            println!("\nRun with -d for debug-level logging.");
            Ok(())
        }

        LogCommands::View { lines } => {
            let Some(log_path) = logging::get_log_path() else {
                println!("No log files found in {}", log_dir.display());
                return Ok(());
            };

            println!("Last {} lines of: {}\n", lines, log_path.display());
            let file = std::fs::File::open(&log_path)
                .with_context(|| format!("Failed to open log file: {:?}", log_path))?;
            let all_lines: Vec<String> = BufReader::new(file)
                .lines()
                .map_while(Result::ok)
                .collect();
            let start = all_lines.len().saturating_sub(lines);

            for line in &all_lines[start..] {
                println!("{}", line);
            }
            if all_lines.is_empty() {
                println!("(empty log file)");
            }
            Ok(())
        }

        LogCommands::Clean { days } => {
            println!("Cleaning up log files older than {} days...\n", days);
            let removed = logging::cleanup_old_logs(days)?;
            if removed > 0 {
                println!("Removed {} old log file(s)", removed);
            } else {
                println!("No old log files to remove");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_locale() {
        assert_eq!(parse_locale("he").unwrap(), Locale::He);
        let err = parse_locale("fr").unwrap_err().to_string();
        assert!(err.contains("en, he, ar"));
    }

    #[tokio::test]
    async fn test_load_config_rejects_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[booking]\notp_length = 2").unwrap();
        let err = load_config(file.path().to_str()).await.unwrap_err();
        assert!(err.to_string().contains("otp_length"));
    }

    #[tokio::test]
    async fn test_load_config_from_custom_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[business]\nname = \"Studio Noa\"").unwrap();
        let config = load_config(file.path().to_str()).await.unwrap();
        assert_eq!(config.business.name, "Studio Noa");
        assert_eq!(config.booking.otp_length, 4);
    }

    #[tokio::test]
    async fn test_slots_rejects_bad_date() {
        let err = cmd_slots(&Config::default(), "cut", "20/10/2026")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }
}
