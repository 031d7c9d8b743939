//! HTTP client for the booking backend
//!
//! The backend exposes Firebase callable functions. Each call is a
//! `POST {base_url}/{function}` with `{"data": ...}`; the reply is either
//! `{"result": ...}` or `{"error": {"status", "message"}}`.

use super::error::{ApiError, Result};
use super::types::{BookingRequest, BookingResponse, SendOtpResponse, Service};
use super::BookingApi;
use crate::config::ApiConfig;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const FN_GET_SERVICES: &str = "getServices";
const FN_GET_SLOTS: &str = "getAvailableTimeSlots";
const FN_SEND_OTP: &str = "sendOTPWhatsApp";
const FN_CREATE_BOOKING: &str = "createPendingRequest";

#[derive(Serialize)]
struct CallableRequest<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Deserialize)]
struct CallableResponse<T> {
    result: Option<T>,
    error: Option<CallableError>,
}

#[derive(Deserialize)]
struct CallableError {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ServicesResult {
    #[serde(default)]
    services: Vec<Service>,
}

#[derive(Deserialize)]
struct SlotsResult {
    #[serde(default)]
    slots: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotsQuery<'a> {
    date: String,
    service_id: &'a str,
}

#[derive(Serialize)]
struct PhonePayload<'a> {
    phone: &'a str,
}

/// reqwest-backed [`BookingApi`]
#[derive(Clone)]
pub struct HttpBookingClient {
    base_url: String,
    client: Client,
}

impl HttpBookingClient {
    /// Build a client with the configured timeouts
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(config.base_url.clone(), client))
    }

    /// Create with custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<D, R>(&self, function: &str, data: &D) -> Result<R>
    where
        D: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, function);
        tracing::debug!("Calling {}", url);

        let response = self
            .client
            .post(&url)
            .json(&CallableRequest { data })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: CallableResponse<R> = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(ApiError::InvalidResponse {
                    function: function.to_string(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }
        };

        if let Some(error) = parsed.error {
            tracing::warn!("{} failed: {} ({})", function, error.message, error.status);
            return Err(ApiError::Remote {
                status: error.status,
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }

        parsed.result.ok_or_else(|| ApiError::InvalidResponse {
            function: function.to_string(),
            message: "missing result".to_string(),
        })
    }
}

#[async_trait]
impl BookingApi for HttpBookingClient {
    async fn get_services(&self) -> Result<Vec<Service>> {
        let result: ServicesResult = self.call(FN_GET_SERVICES, &serde_json::json!({})).await?;
        tracing::info!("Fetched {} services", result.services.len());
        Ok(result.services)
    }

    async fn get_available_time_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Vec<String>> {
        let query = SlotsQuery {
            date: date.format("%Y-%m-%d").to_string(),
            service_id,
        };
        let result: SlotsResult = self.call(FN_GET_SLOTS, &query).await?;
        tracing::debug!("{} slots for {} on {}", result.slots.len(), service_id, query.date);
        Ok(result.slots)
    }

    async fn send_otp(&self, phone: &str) -> Result<SendOtpResponse> {
        self.call(FN_SEND_OTP, &PhonePayload { phone }).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingResponse> {
        let response: BookingResponse = self.call(FN_CREATE_BOOKING, request).await?;
        if response.success {
            tracing::info!(
                "Booking request accepted (id: {})",
                response.booking_id.as_deref().unwrap_or("-")
            );
        } else {
            tracing::info!("Booking rejected: {:?}", response.code);
        }
        Ok(response)
    }
}
