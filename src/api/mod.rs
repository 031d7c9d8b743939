//! Booking Backend API
//!
//! The four remote operations the wizard depends on. The backend owns
//! catalog storage, slot computation, OTP issuance and booking creation;
//! this side only issues requests and interprets replies.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpBookingClient;
pub use error::{ApiError, Result};
pub use types::{
    BookingRequest, BookingResponse, LocalizedText, OtpErrorCode, SendOtpResponse, Service,
};

use async_trait::async_trait;
use chrono::NaiveDate;

/// Remote booking operations
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Full catalog, active and inactive. Callers filter.
    async fn get_services(&self) -> Result<Vec<Service>>;

    /// `HH:MM` start times still open on `date` for `service_id`
    async fn get_available_time_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
    ) -> Result<Vec<String>>;

    /// Deliver a one-time code to `phone` over WhatsApp
    async fn send_otp(&self, phone: &str) -> Result<SendOtpResponse>;

    /// Verify the code and create the booking in one step.
    ///
    /// A rejected code is `Ok` with `success: false` and a typed `code`;
    /// `Err` is reserved for transport and unexpected failures.
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingResponse>;
}
