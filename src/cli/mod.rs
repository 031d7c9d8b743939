//! CLI Module
//!
//! Command-line interface for Appointly using Clap v4.

mod commands;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

pub use commands::load_config;

/// Appointly - book an appointment from your terminal
#[derive(Parser, Debug)]
#[command(name = "appointly")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (writes debug-level logs to ~/.appointly/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the booking wizard (default)
    Book {
        /// Open the wizard directly instead of the landing page
        #[arg(long)]
        skip_landing: bool,
    },

    /// List bookable services
    Services {
        /// Language for service names (en, he, ar)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// List open start times for a service on a date
    Slots {
        /// Service id
        #[arg(short, long)]
        service: String,

        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
    },

    /// Show themes, or select one
    Theme {
        /// Theme id to select
        id: Option<String>,
    },

    /// Show languages, or select one
    Locale {
        /// Language code to select (en, he, ar)
        code: Option<String>,
    },

    /// Show the effective configuration
    Config,

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Log management operations
    Logs {
        #[command(subcommand)]
        operation: LogCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show log file location and status
    Status,
    /// View recent log entries
    View {
        /// Number of lines to show (default: 50)
        #[arg(short, long, default_value = "50")]
        lines: usize,
    },
    /// Clean up old log files
    Clean {
        /// Maximum age in days (default: 7)
        #[arg(short = 'a', long, default_value = "7")]
        days: u64,
    },
}

/// Main CLI entry point. `config` is already loaded and validated.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        None => ui::cmd_book(&config, false).await,
        Some(Commands::Book { skip_landing }) => ui::cmd_book(&config, skip_landing).await,
        Some(Commands::Services { locale }) => {
            commands::cmd_services(&config, locale.as_deref()).await
        }
        Some(Commands::Slots { service, date }) => {
            commands::cmd_slots(&config, &service, &date).await
        }
        Some(Commands::Theme { id }) => commands::cmd_theme(id.as_deref()),
        Some(Commands::Locale { code }) => commands::cmd_locale(code.as_deref()),
        Some(Commands::Config) => commands::cmd_config(&config),
        Some(Commands::Init { force }) => commands::cmd_init(force),
        Some(Commands::Logs { operation }) => commands::cmd_logs(operation),
    }
}
