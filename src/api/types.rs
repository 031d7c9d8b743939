//! Booking API data types
//!
//! Field names follow the backend's camelCase JSON.

use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Per-locale strings. English is the mandatory fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

impl LocalizedText {
    /// Text for `locale`, falling back to English. Empty strings count as missing.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        let localized = match locale {
            Locale::En => self.en.as_deref(),
            Locale::He => self.he.as_deref(),
            Locale::Ar => self.ar.as_deref(),
        };
        localized
            .filter(|s| !s.is_empty())
            .or_else(|| self.en.as_deref().filter(|s| !s.is_empty()))
    }
}

/// A bookable service from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub names: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<LocalizedText>,
    /// Minutes
    pub duration: u32,
    /// Whole currency units
    pub price: i64,
    #[serde(default)]
    pub active: bool,
}

impl Service {
    pub fn name(&self, locale: Locale) -> &str {
        self.names.get(locale).unwrap_or("Unnamed")
    }

    pub fn description(&self, locale: Locale) -> Option<&str> {
        self.descriptions.as_ref().and_then(|d| d.get(locale))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Typed verification failure returned by `createPendingRequest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpErrorCode {
    OtpNotFound,
    OtpExpired,
    OtpTooManyAttempts,
    OtpInvalidCode,
    /// Any code this client does not know about
    #[serde(other)]
    Unknown,
}

impl OtpErrorCode {
    /// The current code can never succeed; only a fresh one will.
    pub fn requires_new_code(&self) -> bool {
        matches!(
            self,
            Self::OtpNotFound | Self::OtpExpired | Self::OtpTooManyAttempts
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<OtpErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_left: Option<u32>,
}

/// Booking plus the OTP code that authorizes it.
///
/// Built once at verify time; the code is wiped when the request is dropped.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub service_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub client_name: String,
    pub phone: String,
    pub code: String,
}

impl std::fmt::Debug for BookingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingRequest")
            .field("service_id", &self.service_id)
            .field("date", &self.date)
            .field("time", &self.time)
            .field("client_name", &self.client_name)
            .field("phone", &self.phone)
            .field("code", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_parse_with_partial_locales() {
        let json = r#"{
            "id": "svc-1",
            "names": {"en": "Haircut", "he": "תספורת", "ar": ""},
            "descriptions": {"en": "Wash and cut"},
            "duration": 45,
            "price": 120,
            "active": true
        }"#;
        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.name(Locale::He), "תספורת");
        // Empty Arabic name falls back to English
        assert_eq!(service.name(Locale::Ar), "Haircut");
        assert_eq!(service.description(Locale::He), Some("Wash and cut"));
        assert_eq!(service.duration, 45);
    }

    #[test]
    fn test_service_without_names_is_unnamed() {
        let json = r#"{"id": "x", "duration": 30, "price": 50}"#;
        let service: Service = serde_json::from_str(json).unwrap();
        assert_eq!(service.name(Locale::En), "Unnamed");
        assert!(!service.active);
        assert!(service.description(Locale::En).is_none());
    }

    #[test]
    fn test_booking_response_structured_failure() {
        let json = r#"{"success": false, "code": "OTP_INVALID_CODE", "attemptsLeft": 2}"#;
        let resp: BookingResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.code, Some(OtpErrorCode::OtpInvalidCode));
        assert_eq!(resp.attempts_left, Some(2));
    }

    #[test]
    fn test_unknown_otp_code_does_not_fail_parsing() {
        let json = r#"{"success": false, "code": "OTP_SOMETHING_NEW"}"#;
        let resp: BookingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.code, Some(OtpErrorCode::Unknown));
    }

    #[test]
    fn test_requires_new_code() {
        assert!(OtpErrorCode::OtpExpired.requires_new_code());
        assert!(OtpErrorCode::OtpNotFound.requires_new_code());
        assert!(OtpErrorCode::OtpTooManyAttempts.requires_new_code());
        assert!(!OtpErrorCode::OtpInvalidCode.requires_new_code());
        assert!(!OtpErrorCode::Unknown.requires_new_code());
    }

    #[test]
    fn test_booking_request_serializes_camel_case() {
        let req = BookingRequest {
            service_id: "svc-1".to_string(),
            date: "2026-10-20".to_string(),
            time: "09:30".to_string(),
            client_name: "Dana".to_string(),
            phone: "0501234567".to_string(),
            code: "1234".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["serviceId"], "svc-1");
        assert_eq!(value["clientName"], "Dana");
        assert_eq!(value["code"], "1234");
        assert!(!format!("{:?}", req).contains("1234"));
    }
}
