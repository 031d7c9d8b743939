//! Booking Wizard
//!
//! Six-step booking flow: service, date, time, contact details, WhatsApp
//! code verification and confirmation. The controller never performs I/O.
//! Every operation returns the [`WizardCommand`]s the shell must run, and
//! results come back through the `on_*` methods.

pub mod calendar;
mod controller;
pub mod errors;
pub mod otp_input;
pub mod time_slots;

pub use calendar::{CalendarGrid, MonthBounds};
pub use controller::{BookingWizard, DetailsField, OtpSession, Toast};
pub use errors::get_friendly_error;
pub use otp_input::OtpInput;
pub use time_slots::{DayPeriod, group_by_period};

use crate::api::BookingRequest;
use crate::config::BookingConfig;
use crate::i18n::Text;
use chrono::NaiveDate;
use std::time::Duration;

/// Current step in the booking wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Service,
    Date,
    Time,
    Details,
    Otp,
    Done,
}

impl Step {
    /// Step number (1-based)
    pub fn number(&self) -> usize {
        match self {
            Self::Service => 1,
            Self::Date => 2,
            Self::Time => 3,
            Self::Details => 4,
            Self::Otp => 5,
            Self::Done => 6,
        }
    }

    /// Steps shown in the progress indicator (excluding Done)
    pub fn total() -> usize {
        5
    }

    pub fn title(&self) -> Text {
        match self {
            Self::Service => Text::SelectService,
            Self::Date => Text::ChooseDate,
            Self::Time => Text::PickTime,
            Self::Details => Text::YourDetails,
            Self::Otp => Text::Verification,
            Self::Done => Text::RequestSent,
        }
    }
}

/// Which send triggered an OTP result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    /// Continue from the details step
    Initial,
    /// "Resend code" on the verification step
    Resend,
}

/// Delayed self-notification. The shell sleeps for `after` and hands the
/// timer back through [`BookingWizard::on_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    CountdownTick { generation: u64 },
    SuccessTransition,
    ShakeEnd { pulse: u32 },
    OtpReset,
    ToastExpire { id: u64 },
}

/// Work the shell performs on behalf of the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    LoadServices,
    LoadSlots {
        seq: u64,
        date: NaiveDate,
        service_id: String,
    },
    SendOtp {
        phone: String,
        purpose: OtpPurpose,
    },
    CreateBooking(BookingRequest),
    Schedule {
        timer: Timer,
        after: Duration,
    },
    /// Discard this wizard and start a fresh one
    Reset,
    /// Leave the wizard (back to the landing page)
    Exit,
}

/// Wizard timing and validation rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub otp_length: usize,
    pub resend_cooldown: u32,
    pub success_delay: Duration,
    pub shake_duration: Duration,
    pub otp_reset_delay: Duration,
    pub toast_duration: Duration,
    pub phone_prefix: String,
    pub phone_digits: usize,
}

impl From<&BookingConfig> for WizardSettings {
    fn from(config: &BookingConfig) -> Self {
        Self {
            otp_length: config.otp_length,
            resend_cooldown: config.resend_cooldown_secs,
            success_delay: Duration::from_millis(config.success_delay_ms),
            shake_duration: Duration::from_millis(config.shake_ms),
            otp_reset_delay: Duration::from_millis(config.otp_reset_delay_ms),
            toast_duration: Duration::from_secs(config.toast_secs),
            phone_prefix: config.phone_prefix.clone(),
            phone_digits: config.phone_digits,
        }
    }
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self::from(&BookingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers() {
        assert_eq!(Step::Service.number(), 1);
        assert_eq!(Step::Otp.number(), 5);
        assert_eq!(Step::Done.number(), 6);
        assert_eq!(Step::total(), 5);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = BookingConfig::default();
        config.otp_length = 6;
        config.success_delay_ms = 200;
        let settings = WizardSettings::from(&config);
        assert_eq!(settings.otp_length, 6);
        assert_eq!(settings.success_delay, Duration::from_millis(200));
        assert_eq!(settings.resend_cooldown, 60);
        assert_eq!(settings.toast_duration, Duration::from_secs(5));
    }
}
