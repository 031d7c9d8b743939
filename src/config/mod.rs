//! Configuration Module
//!
//! Handles application configuration loading, validation, and management.

mod types;

pub use types::{
    ApiConfig, BookingConfig, BusinessConfig, Config, LoggingConfig, appointly_home,
};
