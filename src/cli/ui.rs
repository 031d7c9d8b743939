//! TUI startup: API client, saved preferences, and the booking app.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::HttpBookingClient;
use crate::config::Config;
use crate::preferences::Preferences;
use crate::tui;

/// Start the interactive booking wizard
pub(crate) async fn cmd_book(config: &Config, skip_landing: bool) -> Result<()> {
    tracing::info!("Using booking backend: {}", config.api.base_url);
    let client = HttpBookingClient::new(&config.api).context("Failed to create API client")?;

    let prefs_path = Preferences::default_path();
    let preferences = Preferences::load(&prefs_path);
    tracing::debug!(
        "Preferences: theme={} locale={}",
        preferences.theme,
        preferences.locale
    );

    let mut app = tui::App::new(Arc::new(client), config, preferences, prefs_path);
    if skip_landing {
        app.start_booking();
    }

    tui::run(app).await.context("TUI error")?;
    Ok(())
}
