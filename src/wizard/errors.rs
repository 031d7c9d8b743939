//! User-facing error messages
//!
//! Raw backend and transport errors are mapped onto a handful of short
//! messages. Rules are case-insensitive substring checks evaluated in
//! order; the first match wins.

use crate::api::OtpErrorCode;

pub const TOO_MANY_ATTEMPTS: &str = "Too many attempts. Please wait a few minutes and try again.";
pub const INVALID_PHONE: &str = "Please enter a valid phone number.";
pub const CONNECTION_ERROR: &str = "Connection error. Please check your internet.";
pub const INVALID_CODE: &str = "Invalid code. Please try again.";

/// Class of a raw error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RateLimited,
    InvalidPhone,
    Connection,
    InvalidCode,
    Other,
}

impl ErrorKind {
    pub fn classify(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        if has("too many") || has("rate limit") {
            Self::RateLimited
        } else if has("invalid") && has("phone") {
            Self::InvalidPhone
        } else if has("network") || has("fetch") {
            Self::Connection
        } else if has("code") || has("otp") || has("verification") {
            Self::InvalidCode
        } else {
            Self::Other
        }
    }

    fn message(&self) -> Option<&'static str> {
        match self {
            Self::RateLimited => Some(TOO_MANY_ATTEMPTS),
            Self::InvalidPhone => Some(INVALID_PHONE),
            Self::Connection => Some(CONNECTION_ERROR),
            Self::InvalidCode => Some(INVALID_CODE),
            Self::Other => None,
        }
    }
}

/// Friendly text for a raw error, or the raw text when no rule matches
pub fn get_friendly_error(raw: &str) -> String {
    ErrorKind::classify(raw)
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}

/// Message for a typed verification failure.
///
/// `fallback` is the backend's own text, used for codes this client does
/// not recognize.
pub fn otp_failure_message(
    code: OtpErrorCode,
    attempts_left: Option<u32>,
    fallback: Option<&str>,
) -> String {
    match code {
        OtpErrorCode::OtpInvalidCode => match attempts_left {
            Some(1) => "Incorrect code. 1 attempt remaining.".to_string(),
            Some(n) => format!("Incorrect code. {} attempts remaining.", n),
            None => INVALID_CODE.to_string(),
        },
        OtpErrorCode::OtpExpired => "Code expired. Please request a new code.".to_string(),
        OtpErrorCode::OtpNotFound => "No active code found. Please request a new code.".to_string(),
        OtpErrorCode::OtpTooManyAttempts => {
            "Too many incorrect attempts. Please request a new code.".to_string()
        }
        OtpErrorCode::Unknown => fallback
            .map(get_friendly_error)
            .unwrap_or_else(|| INVALID_CODE.to_string()),
    }
}
