//! Appointly - Terminal Appointment Booking
//!
//! A five-step booking wizard for the terminal: pick a service, a date and
//! a time, enter your details, then confirm with a one-time code sent over
//! WhatsApp. The backend owns the catalog, availability, OTP issuance and
//! booking storage; this crate is the client.
//!
//! ## Quick Start
//!
//! ```bash
//! # Landing page, then the wizard
//! appointly
//!
//! # Straight into the wizard
//! appointly book --skip-landing
//!
//! # What can be booked on a given day
//! appointly services
//! appointly slots --service haircut --date 2026-10-20
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod i18n;
pub mod logging;
pub mod preferences;
pub mod theme;
pub mod tui;
pub mod utils;
pub mod wizard;

pub use api::{ApiError, BookingApi};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
