//! Booking wizard state machine

use super::calendar::{CalendarGrid, MonthBounds};
use super::errors::{get_friendly_error, otp_failure_message};
use super::otp_input::OtpInput;
use super::{OtpPurpose, Step, Timer, WizardCommand, WizardSettings};
use crate::api::{ApiError, BookingRequest, BookingResponse, OtpErrorCode, SendOtpResponse, Service};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use uuid::Uuid;

const TICK: Duration = Duration::from_secs(1);

/// Input focused on the details step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailsField {
    #[default]
    Name,
    Phone,
}

/// Transient error banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Verification-step state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpSession {
    /// Number the current code was sent to
    pub phone_target: Option<String>,
    pub sending: bool,
    pub verifying: bool,
    pub can_resend: bool,
    /// Seconds until resend is allowed
    pub countdown: u32,
    /// Inline error under the code cells
    pub error: Option<String>,
    pub last_error_code: Option<OtpErrorCode>,
    pub attempts_left: Option<u32>,
    pub success: bool,
    pub shake: bool,
    pub shake_pulses: u32,
    generation: u64,
}

impl OtpSession {
    /// Restart the resend countdown. Ticks from earlier countdowns become stale.
    fn start_countdown(&mut self, seconds: u32) -> WizardCommand {
        self.generation += 1;
        self.countdown = seconds;
        self.can_resend = false;
        WizardCommand::Schedule {
            timer: Timer::CountdownTick {
                generation: self.generation,
            },
            after: TICK,
        }
    }

    fn stop_countdown(&mut self) {
        self.generation += 1;
    }

    fn clear_feedback(&mut self) {
        self.error = None;
        self.last_error_code = None;
        self.attempts_left = None;
        self.shake = false;
        self.success = false;
    }
}

pub struct BookingWizard {
    id: Uuid,
    settings: WizardSettings,
    pub step: Step,

    // Step 1
    pub services: Vec<Service>,
    pub services_loading: bool,
    pub load_error: Option<String>,
    services_requested: bool,
    pub service_cursor: usize,
    pub selected_service: Option<Service>,

    // Step 2
    pub calendar: CalendarGrid,
    pub selected_date: Option<NaiveDate>,

    // Step 3
    pub slots: Vec<String>,
    pub slots_loading: bool,
    slots_seq: u64,
    pub slot_cursor: usize,
    pub selected_time: Option<String>,

    // Step 4
    pub name: String,
    pub phone: String,
    pub details_field: DetailsField,

    // Step 5
    pub otp: OtpSession,
    pub otp_input: OtpInput,

    pub toast: Option<Toast>,
    toast_seq: u64,
}

impl BookingWizard {
    pub fn new(settings: WizardSettings, today: NaiveDate) -> Self {
        let otp_input = OtpInput::new(settings.otp_length);
        Self {
            id: Uuid::new_v4(),
            settings,
            step: Step::Service,
            services: Vec::new(),
            services_loading: false,
            load_error: None,
            services_requested: false,
            service_cursor: 0,
            selected_service: None,
            calendar: CalendarGrid::new(today),
            selected_date: None,
            slots: Vec::new(),
            slots_loading: false,
            slots_seq: 0,
            slot_cursor: 0,
            selected_time: None,
            name: String::new(),
            phone: String::new(),
            details_field: DetailsField::Name,
            otp: OtpSession::default(),
            otp_input,
            toast: None,
            toast_seq: 0,
        }
    }

    /// Identity used to drop results addressed to a discarded wizard
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    /// Request the catalog. Only the first call per wizard does anything.
    pub fn mount(&mut self) -> Vec<WizardCommand> {
        if self.services_requested {
            return Vec::new();
        }
        self.services_requested = true;
        self.services_loading = true;
        vec![WizardCommand::LoadServices]
    }

    pub fn on_services_loaded(&mut self, result: Result<Vec<Service>, ApiError>) {
        self.services_loading = false;
        match result {
            Ok(services) => {
                let total = services.len();
                self.services = services.into_iter().filter(|s| s.active).collect();
                self.service_cursor = 0;
                self.load_error = None;
                tracing::debug!("{} of {} services active", self.services.len(), total);
            }
            Err(e) => {
                tracing::warn!("Failed to load services: {}", e);
                self.load_error = Some(get_friendly_error(&e.to_string()));
            }
        }
    }

    pub fn phone_is_valid(&self) -> bool {
        self.phone.len() == self.settings.phone_digits
            && self.phone.starts_with(&self.settings.phone_prefix)
            && self.phone.chars().all(|c| c.is_ascii_digit())
    }

    /// Whether the active step's required input is present and valid
    pub fn can_continue(&self) -> bool {
        match self.step {
            Step::Service => self.selected_service.is_some(),
            Step::Date => self
                .selected_date
                .is_some_and(|d| d >= self.calendar.today()),
            Step::Time => self
                .selected_time
                .as_ref()
                .is_some_and(|t| self.slots.contains(t)),
            Step::Details => !self.name.trim().is_empty() && self.phone_is_valid(),
            Step::Otp | Step::Done => false,
        }
    }

    /// Forward action for the active step
    pub fn continue_step(&mut self) -> Vec<WizardCommand> {
        if !self.can_continue() {
            return Vec::new();
        }
        match self.step {
            Step::Service => {
                self.step = Step::Date;
                Vec::new()
            }
            Step::Date => {
                self.step = Step::Time;
                self.request_slots()
            }
            Step::Time => {
                self.step = Step::Details;
                Vec::new()
            }
            Step::Details => {
                if self.otp.sending {
                    return Vec::new();
                }
                self.otp.sending = true;
                self.toast = None;
                self.otp.phone_target = Some(self.phone.clone());
                vec![WizardCommand::SendOtp {
                    phone: self.phone.clone(),
                    purpose: OtpPurpose::Initial,
                }]
            }
            Step::Otp | Step::Done => Vec::new(),
        }
    }

    /// Go one step back, clearing what belongs to the step being left
    pub fn back(&mut self) -> Vec<WizardCommand> {
        // A submitted code either confirms the booking or comes back as a failure
        if self.step == Step::Otp && (self.otp.verifying || self.otp.success) {
            return Vec::new();
        }
        self.toast = None;
        match self.step {
            Step::Service => vec![WizardCommand::Exit],
            Step::Date => {
                self.step = Step::Service;
                Vec::new()
            }
            Step::Time => {
                self.step = Step::Date;
                self.selected_time = None;
                self.slots_loading = false;
                // In-flight slot loads are now stale
                self.slots_seq += 1;
                Vec::new()
            }
            Step::Details => {
                self.step = Step::Time;
                self.request_slots()
            }
            Step::Otp => {
                self.step = Step::Details;
                self.otp.clear_feedback();
                self.otp.stop_countdown();
                self.otp_input.reset();
                self.otp_input.set_disabled(false);
                Vec::new()
            }
            Step::Done => Vec::new(),
        }
    }

    pub fn select_service(&mut self, index: usize) -> Vec<WizardCommand> {
        let Some(service) = self.services.get(index) else {
            return Vec::new();
        };
        self.service_cursor = index;
        self.selected_service = Some(service.clone());
        if self.step == Step::Time {
            return self.request_slots();
        }
        Vec::new()
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Vec<WizardCommand> {
        if self.calendar.is_disabled(date) {
            return Vec::new();
        }
        self.calendar.focus(date);
        self.selected_date = Some(date);
        if self.step == Step::Time {
            return self.request_slots();
        }
        Vec::new()
    }

    pub fn select_time(&mut self, index: usize) {
        if let Some(slot) = self.slots.get(index) {
            self.slot_cursor = index;
            self.selected_time = Some(slot.clone());
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Keep digits only, up to the configured length
    pub fn set_phone(&mut self, input: &str) {
        self.phone = input
            .chars()
            .filter(char::is_ascii_digit)
            .take(self.settings.phone_digits)
            .collect();
    }

    /// Clear the selected time and fetch slots for the current selection
    fn request_slots(&mut self) -> Vec<WizardCommand> {
        self.selected_time = None;
        self.slot_cursor = 0;
        self.slots.clear();
        self.slots_seq += 1;

        let (Some(service), Some(date)) = (&self.selected_service, self.selected_date) else {
            self.slots_loading = false;
            return Vec::new();
        };
        self.slots_loading = true;
        vec![WizardCommand::LoadSlots {
            seq: self.slots_seq,
            date,
            service_id: service.id.clone(),
        }]
    }

    pub fn on_slots_loaded(&mut self, seq: u64, result: Result<Vec<String>, ApiError>) {
        if seq != self.slots_seq || self.step != Step::Time {
            tracing::debug!("Ignoring stale slot response (seq {} != {})", seq, self.slots_seq);
            return;
        }
        self.slots_loading = false;
        self.slot_cursor = 0;
        self.slots = match result {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!("Failed to load time slots: {}", e);
                Vec::new()
            }
        };
    }

    /// Send a fresh code while on the verification step
    pub fn resend(&mut self) -> Vec<WizardCommand> {
        if self.step != Step::Otp
            || !self.otp.can_resend
            || self.otp.sending
            || self.otp.verifying
            || self.otp.success
        {
            return Vec::new();
        }
        self.otp.sending = true;
        self.otp.error = None;
        let phone = self
            .otp
            .phone_target
            .clone()
            .unwrap_or_else(|| self.phone.clone());
        vec![WizardCommand::SendOtp {
            phone,
            purpose: OtpPurpose::Resend,
        }]
    }

    pub fn on_otp_sent(
        &mut self,
        purpose: OtpPurpose,
        result: Result<SendOtpResponse, ApiError>,
    ) -> Vec<WizardCommand> {
        self.otp.sending = false;

        let expected_step = match purpose {
            OtpPurpose::Initial => Step::Details,
            OtpPurpose::Resend => Step::Otp,
        };
        if self.step != expected_step {
            tracing::debug!("Ignoring {:?} OTP result on step {:?}", purpose, self.step);
            return Vec::new();
        }

        let failure = match result {
            Ok(resp) if resp.success => None,
            Ok(resp) => Some(resp.message.unwrap_or_else(|| "Failed to send code".to_string())),
            Err(e) => Some(e.to_string()),
        };

        if let Some(raw) = failure {
            tracing::warn!("Failed to send code ({:?}): {}", purpose, raw);
            let message = get_friendly_error(&raw);
            return match purpose {
                OtpPurpose::Initial => self.show_toast(message),
                OtpPurpose::Resend => {
                    self.otp.error = Some(message);
                    Vec::new()
                }
            };
        }

        tracing::info!("Verification code sent ({:?})", purpose);
        self.otp.clear_feedback();
        if purpose == OtpPurpose::Initial {
            self.step = Step::Otp;
            self.otp_input.reset();
            self.otp_input.set_disabled(false);
        }
        vec![self.otp.start_countdown(self.settings.resend_cooldown)]
    }

    /// The code widget filled up. Submits once until the widget is reset.
    pub fn on_code_complete(&mut self, code: String) -> Vec<WizardCommand> {
        if self.step != Step::Otp || self.otp.verifying || self.otp.success {
            return Vec::new();
        }
        let (Some(service), Some(date), Some(time)) =
            (&self.selected_service, self.selected_date, &self.selected_time)
        else {
            return Vec::new();
        };

        let request = BookingRequest {
            service_id: service.id.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            time: time.clone(),
            client_name: self.name.trim().to_string(),
            phone: self
                .otp
                .phone_target
                .clone()
                .unwrap_or_else(|| self.phone.clone()),
            code,
        };

        self.otp.verifying = true;
        self.otp.error = None;
        self.otp_input.set_disabled(true);
        vec![WizardCommand::CreateBooking(request)]
    }

    pub fn on_booking_resolved(
        &mut self,
        result: Result<BookingResponse, ApiError>,
    ) -> Vec<WizardCommand> {
        if self.step != Step::Otp || !self.otp.verifying {
            tracing::debug!("Ignoring booking result outside verification");
            return Vec::new();
        }
        self.otp.verifying = false;

        let mut commands = Vec::new();
        match result {
            Ok(resp) if resp.success => {
                tracing::info!("Booking request submitted");
                self.otp.success = true;
                self.otp.error = None;
                self.otp.stop_countdown();
                return vec![WizardCommand::Schedule {
                    timer: Timer::SuccessTransition,
                    after: self.settings.success_delay,
                }];
            }
            Ok(resp) => {
                let message = match resp.code {
                    Some(code) => {
                        otp_failure_message(code, resp.attempts_left, resp.error.as_deref())
                    }
                    None => get_friendly_error(
                        resp.error
                            .as_deref()
                            .or(resp.message.as_deref())
                            .unwrap_or("Invalid code"),
                    ),
                };
                tracing::info!("Verification rejected: {:?}", resp.code);
                self.otp.error = Some(message);
                self.otp.last_error_code = resp.code;
                self.otp.attempts_left = resp.attempts_left;

                if resp.code == Some(OtpErrorCode::OtpInvalidCode) {
                    commands.push(self.shake());
                }
                if resp.code.is_some_and(|c| c.requires_new_code()) {
                    self.otp.stop_countdown();
                    self.otp.countdown = 0;
                    self.otp.can_resend = true;
                }
            }
            Err(e) => {
                tracing::warn!("Booking request failed: {}", e);
                self.otp.error = Some(get_friendly_error(&e.to_string()));
                self.otp.last_error_code = None;
                commands.push(self.shake());
            }
        }

        self.otp_input.set_disabled(false);
        commands.push(WizardCommand::Schedule {
            timer: Timer::OtpReset,
            after: self.settings.otp_reset_delay,
        });
        commands
    }

    fn shake(&mut self) -> WizardCommand {
        self.otp.shake = true;
        self.otp.shake_pulses += 1;
        WizardCommand::Schedule {
            timer: Timer::ShakeEnd {
                pulse: self.otp.shake_pulses,
            },
            after: self.settings.shake_duration,
        }
    }

    fn show_toast(&mut self, message: String) -> Vec<WizardCommand> {
        self.toast_seq += 1;
        self.toast = Some(Toast {
            id: self.toast_seq,
            message,
        });
        vec![WizardCommand::Schedule {
            timer: Timer::ToastExpire { id: self.toast_seq },
            after: self.settings.toast_duration,
        }]
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn on_timer(&mut self, timer: Timer) -> Vec<WizardCommand> {
        match timer {
            Timer::CountdownTick { generation } => {
                if self.step != Step::Otp
                    || self.otp.can_resend
                    || generation != self.otp.generation
                {
                    return Vec::new();
                }
                self.otp.countdown = self.otp.countdown.saturating_sub(1);
                if self.otp.countdown == 0 {
                    self.otp.can_resend = true;
                    return Vec::new();
                }
                vec![WizardCommand::Schedule { timer, after: TICK }]
            }
            Timer::SuccessTransition => {
                if self.step == Step::Otp && self.otp.success {
                    self.step = Step::Done;
                }
                Vec::new()
            }
            Timer::ShakeEnd { pulse } => {
                if pulse == self.otp.shake_pulses {
                    self.otp.shake = false;
                }
                Vec::new()
            }
            Timer::OtpReset => {
                if self.step == Step::Otp && !self.otp.verifying && !self.otp.success {
                    self.otp_input.reset();
                }
                Vec::new()
            }
            Timer::ToastExpire { id } => {
                if self.toast.as_ref().is_some_and(|t| t.id == id) {
                    self.toast = None;
                }
                Vec::new()
            }
        }
    }

    // --- Keyboard ---

    pub fn handle_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        if event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Vec::new();
        }

        if event.code == KeyCode::Esc {
            if self.toast.is_some() {
                self.dismiss_toast();
                return Vec::new();
            }
            return self.back();
        }

        match self.step {
            Step::Service => self.handle_service_key(event),
            Step::Date => self.handle_date_key(event),
            Step::Time => self.handle_time_key(event),
            Step::Details => self.handle_details_key(event),
            Step::Otp => self.handle_otp_key(event),
            Step::Done => match event.code {
                KeyCode::Enter | KeyCode::Char(' ') => vec![WizardCommand::Reset],
                _ => Vec::new(),
            },
        }
    }

    fn handle_service_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        if self.load_error.is_some() {
            return match event.code {
                KeyCode::Char('r') | KeyCode::Enter => vec![WizardCommand::Reset],
                _ => Vec::new(),
            };
        }
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.service_cursor = self.service_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.services.is_empty() {
                    self.service_cursor = (self.service_cursor + 1).min(self.services.len() - 1);
                }
            }
            KeyCode::Char(' ') => {
                return self.select_service(self.service_cursor);
            }
            KeyCode::Enter => {
                let mut commands = self.select_service(self.service_cursor);
                commands.extend(self.continue_step());
                return commands;
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_date_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        match event.code {
            KeyCode::Left | KeyCode::Char('h') => {
                let bounds = self.calendar.move_cursor(-1);
                self.on_month_change(bounds);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let bounds = self.calendar.move_cursor(1);
                self.on_month_change(bounds);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let bounds = self.calendar.move_cursor(-7);
                self.on_month_change(bounds);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let bounds = self.calendar.move_cursor(7);
                self.on_month_change(bounds);
            }
            KeyCode::PageUp | KeyCode::Char('<') => {
                let bounds = self.calendar.previous_month();
                self.on_month_change(bounds);
            }
            KeyCode::PageDown | KeyCode::Char('>') => {
                let bounds = self.calendar.next_month();
                self.on_month_change(bounds);
            }
            KeyCode::Char(' ') => {
                if let Some(date) = self.calendar.selectable_cursor() {
                    return self.select_date(date);
                }
            }
            KeyCode::Enter => {
                let mut commands = Vec::new();
                if let Some(date) = self.calendar.selectable_cursor() {
                    commands.extend(self.select_date(date));
                }
                commands.extend(self.continue_step());
                return commands;
            }
            _ => {}
        }
        Vec::new()
    }

    /// The backend has no per-month availability call, so every future day
    /// stays selectable and a new month needs no fetch.
    fn on_month_change(&self, bounds: Option<MonthBounds>) {
        if let Some(bounds) = bounds {
            tracing::debug!("Calendar showing {} to {}", bounds.first, bounds.last);
        }
    }

    /// Slots are laid out four to a row
    fn handle_time_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        if self.slots.is_empty() {
            return Vec::new();
        }
        let last = self.slots.len() - 1;
        match event.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.slot_cursor = self.slot_cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.slot_cursor = (self.slot_cursor + 1).min(last);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.slot_cursor = self.slot_cursor.saturating_sub(4);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.slot_cursor = (self.slot_cursor + 4).min(last);
            }
            KeyCode::Char(' ') => self.select_time(self.slot_cursor),
            KeyCode::Enter => {
                self.select_time(self.slot_cursor);
                return self.continue_step();
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_details_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        // Fields are frozen while the code is being sent to them
        if self.otp.sending && matches!(event.code, KeyCode::Char(_) | KeyCode::Backspace) {
            return Vec::new();
        }
        match event.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.details_field = match self.details_field {
                    DetailsField::Name => DetailsField::Phone,
                    DetailsField::Phone => DetailsField::Name,
                };
            }
            KeyCode::Enter => {
                if self.details_field == DetailsField::Name {
                    self.details_field = DetailsField::Phone;
                } else {
                    return self.continue_step();
                }
            }
            KeyCode::Backspace => match self.details_field {
                DetailsField::Name => {
                    self.name.pop();
                }
                DetailsField::Phone => {
                    self.phone.pop();
                }
            },
            KeyCode::Char(c) => match self.details_field {
                DetailsField::Name => self.name.push(c),
                DetailsField::Phone => {
                    let phone = format!("{}{}", self.phone, c);
                    self.set_phone(&phone);
                }
            },
            _ => {}
        }
        Vec::new()
    }

    fn handle_otp_key(&mut self, event: KeyEvent) -> Vec<WizardCommand> {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(code) = self.otp_input.input_digit(c) {
                    return self.on_code_complete(code);
                }
            }
            KeyCode::Char('r') => return self.resend(),
            KeyCode::Backspace => self.otp_input.backspace(),
            KeyCode::Left => self.otp_input.move_left(),
            KeyCode::Right => self.otp_input.move_right(),
            _ => {}
        }
        Vec::new()
    }

    /// Bracketed paste from the terminal
    pub fn handle_paste(&mut self, text: &str) -> Vec<WizardCommand> {
        match self.step {
            Step::Otp => match self.otp_input.paste(text) {
                Some(code) => self.on_code_complete(code),
                None => Vec::new(),
            },
            Step::Details if !self.otp.sending => {
                match self.details_field {
                    DetailsField::Name => {
                        self.name.push_str(text.lines().next().unwrap_or_default())
                    }
                    DetailsField::Phone => {
                        let phone = format!("{}{}", self.phone, text);
                        self.set_phone(&phone);
                    }
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LocalizedText;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn service(id: &str, active: bool) -> Service {
        Service {
            id: id.to_string(),
            names: LocalizedText {
                en: Some(format!("Service {}", id)),
                he: None,
                ar: None,
            },
            descriptions: None,
            duration: 30,
            price: 100,
            active,
        }
    }

    fn slots(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn wizard() -> BookingWizard {
        let mut w = BookingWizard::new(WizardSettings::default(), today());
        w.mount();
        w.on_services_loaded(Ok(vec![service("a", true), service("b", true)]));
        w
    }

    fn load_slots_seq(commands: &[WizardCommand]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                WizardCommand::LoadSlots { seq, .. } => Some(*seq),
                _ => None,
            })
            .expect("LoadSlots command")
    }

    /// Drive a wizard to the time step with slots loaded
    fn at_time_step() -> BookingWizard {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today());
        let seq = load_slots_seq(&w.continue_step());
        w.on_slots_loaded(seq, Ok(slots(&["09:00", "09:30", "14:00"])));
        w
    }

    fn at_details_step() -> BookingWizard {
        let mut w = at_time_step();
        w.select_time(1);
        w.continue_step();
        w.set_name("Dana Levi");
        w.set_phone("0501234567");
        w
    }

    fn at_otp_step() -> BookingWizard {
        let mut w = at_details_step();
        w.continue_step();
        w.on_otp_sent(OtpPurpose::Initial, Ok(SendOtpResponse { success: true, message: None }));
        assert_eq!(w.step, Step::Otp);
        w
    }

    fn verifying() -> BookingWizard {
        let mut w = at_otp_step();
        let commands = w.handle_paste("1234");
        assert!(matches!(&commands[..], [WizardCommand::CreateBooking(_)]));
        w
    }

    fn has_timer(commands: &[WizardCommand], wanted: impl Fn(&Timer) -> bool) -> bool {
        commands.iter().any(|c| match c {
            WizardCommand::Schedule { timer, .. } => wanted(timer),
            _ => false,
        })
    }

    // ── Loading ──

    #[test]
    fn test_mount_loads_services_once() {
        let mut w = BookingWizard::new(WizardSettings::default(), today());
        assert_eq!(w.mount(), vec![WizardCommand::LoadServices]);
        assert!(w.services_loading);
        assert!(w.mount().is_empty());
        assert!(w.mount().is_empty());
    }

    #[test]
    fn test_only_active_services_kept() {
        let mut w = BookingWizard::new(WizardSettings::default(), today());
        w.mount();
        w.on_services_loaded(Ok(vec![service("a", true), service("b", false), service("c", true)]));
        let ids: Vec<&str> = w.services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!w.services_loading);
    }

    #[test]
    fn test_services_failure_offers_reload() {
        let mut w = BookingWizard::new(WizardSettings::default(), today());
        w.mount();
        w.on_services_loaded(Err(ApiError::Network("connection refused".into())));
        assert_eq!(
            w.load_error.as_deref(),
            Some("Connection error. Please check your internet.")
        );
        assert_eq!(w.handle_key(key(KeyCode::Char('r'))), vec![WizardCommand::Reset]);
    }

    // ── Navigation ──

    #[test]
    fn test_cannot_continue_without_selection() {
        let mut w = wizard();
        assert!(!w.can_continue());
        assert!(w.continue_step().is_empty());
        assert_eq!(w.step, Step::Service);

        w.select_service(1);
        assert!(w.can_continue());
        w.continue_step();
        assert_eq!(w.step, Step::Date);
        assert!(!w.can_continue());
    }

    #[test]
    fn test_past_date_cannot_be_selected() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today().pred_opt().unwrap());
        assert_eq!(w.selected_date, None);
        assert!(!w.can_continue());
    }

    #[test]
    fn test_back_on_first_step_exits() {
        let mut w = wizard();
        assert_eq!(w.back(), vec![WizardCommand::Exit]);
        assert_eq!(w.handle_key(key(KeyCode::Esc)), vec![WizardCommand::Exit]);
    }

    #[test]
    fn test_entering_time_step_loads_slots() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today());
        let commands = w.continue_step();
        assert_eq!(w.step, Step::Time);
        assert!(w.slots_loading);
        match &commands[..] {
            [WizardCommand::LoadSlots { date, service_id, .. }] => {
                assert_eq!(*date, today());
                assert_eq!(service_id, "a");
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_time_must_come_from_slot_list() {
        let mut w = at_time_step();
        assert!(!w.can_continue());
        w.selected_time = Some("23:59".to_string());
        assert!(!w.can_continue());
        w.select_time(2);
        assert_eq!(w.selected_time.as_deref(), Some("14:00"));
        assert!(w.can_continue());
    }

    #[test]
    fn test_stale_slot_response_ignored() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today());
        let first = load_slots_seq(&w.continue_step());

        // Date changes while the first request is in flight
        let tomorrow = today().succ_opt().unwrap();
        let second = load_slots_seq(&w.select_date(tomorrow));
        assert!(second > first);

        w.on_slots_loaded(first, Ok(slots(&["08:00"])));
        assert!(w.slots.is_empty());
        assert!(w.slots_loading);

        w.on_slots_loaded(second, Ok(slots(&["10:00"])));
        assert_eq!(w.slots, slots(&["10:00"]));
        assert!(!w.slots_loading);
    }

    #[test]
    fn test_slot_response_after_leaving_step_ignored() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today());
        let seq = load_slots_seq(&w.continue_step());
        w.back();
        assert_eq!(w.step, Step::Date);
        w.on_slots_loaded(seq, Ok(slots(&["10:00"])));
        assert!(w.slots.is_empty());
    }

    #[test]
    fn test_slot_failure_shows_empty_list() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        w.select_date(today());
        let seq = load_slots_seq(&w.continue_step());
        w.on_slots_loaded(seq, Err(ApiError::Network("timeout".into())));
        assert!(w.slots.is_empty());
        assert!(!w.slots_loading);
        assert!(!w.can_continue());
    }

    #[test]
    fn test_back_from_time_clears_selected_time() {
        let mut w = at_time_step();
        w.select_time(0);
        w.back();
        assert_eq!(w.step, Step::Date);
        assert_eq!(w.selected_time, None);
        assert_eq!(w.selected_date, Some(today()));
    }

    #[test]
    fn test_back_from_details_reloads_slots() {
        let mut w = at_details_step();
        let commands = w.back();
        assert_eq!(w.step, Step::Time);
        assert_eq!(w.selected_time, None);
        load_slots_seq(&commands);
    }

    // ── Details ──

    #[test]
    fn test_phone_keeps_digits_only() {
        let mut w = wizard();
        w.set_phone("050-123 4567 89");
        assert_eq!(w.phone, "0501234567");
    }

    #[test]
    fn test_details_validation() {
        let mut w = at_details_step();
        assert!(w.can_continue());

        w.set_name("   ");
        assert!(!w.can_continue());

        w.set_name("Dana");
        w.set_phone("050123456");
        assert!(!w.can_continue(), "nine digits");

        w.set_phone("0721234567");
        assert!(!w.can_continue(), "wrong prefix");
    }

    #[test]
    fn test_details_typing() {
        let mut w = at_time_step();
        w.select_time(0);
        w.continue_step();
        for c in "Avi".chars() {
            w.handle_key(key(KeyCode::Char(c)));
        }
        w.handle_key(key(KeyCode::Tab));
        for c in "05x01234567".chars() {
            w.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(w.name, "Avi");
        assert_eq!(w.phone, "0501234567");
        w.handle_key(key(KeyCode::Backspace));
        assert_eq!(w.phone, "050123456");
    }

    // ── Sending the code ──

    #[test]
    fn test_initial_send_moves_to_otp_and_starts_countdown() {
        let mut w = at_details_step();
        let commands = w.continue_step();
        assert_eq!(
            commands,
            vec![WizardCommand::SendOtp {
                phone: "0501234567".to_string(),
                purpose: OtpPurpose::Initial
            }]
        );
        assert!(w.otp.sending);
        // Second press while sending does nothing
        assert!(w.continue_step().is_empty());

        let commands =
            w.on_otp_sent(OtpPurpose::Initial, Ok(SendOtpResponse { success: true, message: None }));
        assert_eq!(w.step, Step::Otp);
        assert!(!w.otp.sending);
        assert!(!w.otp.can_resend);
        assert_eq!(w.otp.countdown, 60);
        assert!(has_timer(&commands, |t| matches!(t, Timer::CountdownTick { .. })));
    }

    #[test]
    fn test_initial_send_failure_shows_toast_and_stays() {
        let mut w = at_details_step();
        w.continue_step();
        let commands = w.on_otp_sent(
            OtpPurpose::Initial,
            Err(ApiError::Remote {
                status: "INVALID_ARGUMENT".into(),
                message: "Invalid phone number".into(),
            }),
        );
        assert_eq!(w.step, Step::Details);
        let toast = w.toast.clone().unwrap();
        assert_eq!(toast.message, "Please enter a valid phone number.");

        // Toast expires after its own timer only
        w.on_timer(Timer::ToastExpire { id: toast.id + 1 });
        assert!(w.toast.is_some());
        assert!(has_timer(&commands, |t| *t == Timer::ToastExpire { id: toast.id }));
        w.on_timer(Timer::ToastExpire { id: toast.id });
        assert!(w.toast.is_none());
    }

    #[test]
    fn test_send_reported_unsuccessful_is_failure() {
        let mut w = at_details_step();
        w.continue_step();
        w.on_otp_sent(
            OtpPurpose::Initial,
            Ok(SendOtpResponse {
                success: false,
                message: Some("Too many requests".into()),
            }),
        );
        assert_eq!(w.step, Step::Details);
        assert_eq!(
            w.toast.as_ref().map(|t| t.message.as_str()),
            Some("Too many attempts. Please wait a few minutes and try again.")
        );
    }

    // ── Countdown and resend ──

    fn countdown_generation(w: &BookingWizard) -> u64 {
        w.otp.generation
    }

    #[test]
    fn test_countdown_reaches_zero_and_enables_resend() {
        let mut w = at_otp_step();
        let generation = countdown_generation(&w);
        let tick = Timer::CountdownTick { generation };
        for expected in (1..60).rev() {
            let commands = w.on_timer(tick);
            assert_eq!(w.otp.countdown, expected);
            assert!(has_timer(&commands, |t| *t == tick));
        }
        let commands = w.on_timer(tick);
        assert_eq!(w.otp.countdown, 0);
        assert!(w.otp.can_resend);
        assert!(commands.is_empty());

        // Further ticks do nothing
        w.on_timer(tick);
        assert_eq!(w.otp.countdown, 0);
    }

    #[test]
    fn test_stale_countdown_tick_ignored() {
        let mut w = at_otp_step();
        let generation = countdown_generation(&w);
        w.on_timer(Timer::CountdownTick { generation: generation - 1 });
        assert_eq!(w.otp.countdown, 60);
    }

    #[test]
    fn test_countdown_stops_off_step() {
        let mut w = at_otp_step();
        let generation = countdown_generation(&w);
        w.back();
        w.on_timer(Timer::CountdownTick { generation });
        assert_eq!(w.step, Step::Details);
        assert_eq!(w.otp.countdown, 60);
    }

    #[test]
    fn test_resend_requires_cooldown() {
        let mut w = at_otp_step();
        assert!(w.resend().is_empty());
        assert!(w.handle_key(key(KeyCode::Char('r'))).is_empty());

        w.otp.countdown = 1;
        let generation = countdown_generation(&w);
        w.on_timer(Timer::CountdownTick { generation });
        assert!(w.otp.can_resend);

        let commands = w.handle_key(key(KeyCode::Char('r')));
        assert_eq!(
            commands,
            vec![WizardCommand::SendOtp {
                phone: "0501234567".to_string(),
                purpose: OtpPurpose::Resend
            }]
        );
        assert!(w.resend().is_empty(), "already sending");

        let commands =
            w.on_otp_sent(OtpPurpose::Resend, Ok(SendOtpResponse { success: true, message: None }));
        assert!(!w.otp.can_resend);
        assert_eq!(w.otp.countdown, 60);
        assert!(has_timer(&commands, |t| matches!(t, Timer::CountdownTick { .. })));
    }

    #[test]
    fn test_resend_failure_is_inline() {
        let mut w = at_otp_step();
        w.otp.can_resend = true;
        w.resend();
        w.on_otp_sent(OtpPurpose::Resend, Err(ApiError::Network("dns".into())));
        assert_eq!(w.step, Step::Otp);
        assert!(w.toast.is_none());
        assert_eq!(
            w.otp.error.as_deref(),
            Some("Connection error. Please check your internet.")
        );
    }

    // ── Verification ──

    #[test]
    fn test_code_submitted_once() {
        let mut w = at_otp_step();
        for c in "123".chars() {
            assert!(w.handle_key(key(KeyCode::Char(c))).is_empty());
        }
        let commands = w.handle_key(key(KeyCode::Char('4')));
        match &commands[..] {
            [WizardCommand::CreateBooking(req)] => {
                assert_eq!(req.service_id, "a");
                assert_eq!(req.date, "2026-10-16");
                assert_eq!(req.time, "09:30");
                assert_eq!(req.client_name, "Dana Levi");
                assert_eq!(req.phone, "0501234567");
                assert_eq!(req.code, "1234");
            }
            other => panic!("unexpected commands: {:?}", other),
        }
        assert!(w.otp.verifying);
        assert!(w.handle_paste("5678").is_empty());
        assert!(w.on_code_complete("5678".into()).is_empty());
    }

    #[test]
    fn test_success_then_single_transition() {
        let mut w = verifying();
        let commands = w.on_booking_resolved(Ok(BookingResponse {
            success: true,
            booking_id: Some("bk-1".into()),
            ..Default::default()
        }));
        assert!(w.otp.success);
        assert_eq!(w.step, Step::Otp);
        assert!(has_timer(&commands, |t| *t == Timer::SuccessTransition));

        w.on_timer(Timer::SuccessTransition);
        assert_eq!(w.step, Step::Done);
        w.on_timer(Timer::SuccessTransition);
        assert_eq!(w.step, Step::Done);
        assert!(w.back().is_empty());
        assert_eq!(w.handle_key(key(KeyCode::Enter)), vec![WizardCommand::Reset]);
    }

    #[test]
    fn test_invalid_code_shakes_once_and_resets_widget() {
        let mut w = verifying();
        let commands = w.on_booking_resolved(Ok(BookingResponse {
            success: false,
            code: Some(OtpErrorCode::OtpInvalidCode),
            attempts_left: Some(2),
            ..Default::default()
        }));

        assert_eq!(w.otp.error.as_deref(), Some("Incorrect code. 2 attempts remaining."));
        assert_eq!(w.otp.attempts_left, Some(2));
        assert!(w.otp.shake);
        assert_eq!(w.otp.shake_pulses, 1);
        assert!(!w.otp.can_resend);
        assert!(has_timer(&commands, |t| *t == Timer::ShakeEnd { pulse: 1 }));
        assert!(has_timer(&commands, |t| *t == Timer::OtpReset));

        w.on_timer(Timer::ShakeEnd { pulse: 1 });
        assert!(!w.otp.shake);

        w.on_timer(Timer::OtpReset);
        assert!(w.otp_input.is_empty());
        // Widget re-armed: a new code can be submitted
        assert!(!w.handle_paste("4321").is_empty());
    }

    #[test]
    fn test_expired_code_enables_resend_without_shake() {
        let mut w = verifying();
        let commands = w.on_booking_resolved(Ok(BookingResponse {
            success: false,
            code: Some(OtpErrorCode::OtpExpired),
            error: Some("OTP expired".into()),
            ..Default::default()
        }));
        assert!(w.otp.can_resend);
        assert_eq!(w.otp.countdown, 0);
        assert!(!w.otp.shake);
        assert_eq!(w.otp.shake_pulses, 0);
        assert_eq!(w.otp.last_error_code, Some(OtpErrorCode::OtpExpired));
        assert!(has_timer(&commands, |t| *t == Timer::OtpReset));

        // A tick from the countdown that was running stays a no-op
        w.on_timer(Timer::CountdownTick {
            generation: countdown_generation(&w) - 1,
        });
        assert_eq!(w.otp.countdown, 0);
        assert!(w.otp.can_resend);

        assert!(!w.resend().is_empty());
    }

    #[test]
    fn test_transport_error_is_classified_and_shakes() {
        let mut w = verifying();
        let commands = w.on_booking_resolved(Err(ApiError::Network("connection reset".into())));
        assert_eq!(
            w.otp.error.as_deref(),
            Some("Connection error. Please check your internet.")
        );
        assert!(w.otp.shake);
        assert!(!w.otp.verifying);
        assert!(has_timer(&commands, |t| *t == Timer::OtpReset));
    }

    #[test]
    fn test_stale_shake_end_keeps_newer_pulse() {
        let mut w = verifying();
        w.on_booking_resolved(Err(ApiError::Network("x".into())));
        w.on_timer(Timer::OtpReset);
        w.handle_paste("1111");
        w.on_booking_resolved(Err(ApiError::Network("x".into())));
        assert_eq!(w.otp.shake_pulses, 2);

        w.on_timer(Timer::ShakeEnd { pulse: 1 });
        assert!(w.otp.shake);
        w.on_timer(Timer::ShakeEnd { pulse: 2 });
        assert!(!w.otp.shake);
    }

    #[test]
    fn test_back_from_otp_clears_verification_state() {
        let mut w = verifying();
        w.on_booking_resolved(Ok(BookingResponse {
            success: false,
            code: Some(OtpErrorCode::OtpInvalidCode),
            attempts_left: Some(1),
            ..Default::default()
        }));
        w.back();
        assert_eq!(w.step, Step::Details);
        assert_eq!(w.otp.error, None);
        assert_eq!(w.otp.attempts_left, None);
        assert!(!w.otp.shake);
        assert!(w.otp_input.is_empty());
        assert_eq!(w.name, "Dana Levi");
    }

    #[test]
    fn test_back_blocked_while_verifying() {
        let mut w = verifying();
        assert!(w.handle_key(key(KeyCode::Esc)).is_empty());
        assert_eq!(w.step, Step::Otp);
        assert!(w.otp.verifying);

        // The confirmed booking still lands
        let commands = w.on_booking_resolved(Ok(BookingResponse {
            success: true,
            ..Default::default()
        }));
        assert!(has_timer(&commands, |t| *t == Timer::SuccessTransition));
        w.on_timer(Timer::SuccessTransition);
        assert_eq!(w.step, Step::Done);
    }

    #[test]
    fn test_esc_during_success_delay_still_reaches_done() {
        let mut w = verifying();
        w.on_booking_resolved(Ok(BookingResponse {
            success: true,
            booking_id: Some("abc".into()),
            ..Default::default()
        }));

        assert!(w.handle_key(key(KeyCode::Esc)).is_empty());
        assert_eq!(w.step, Step::Otp);
        assert!(w.otp.success);
        assert!(w.resend().is_empty());

        w.on_timer(Timer::SuccessTransition);
        assert_eq!(w.step, Step::Done);
    }

    #[test]
    fn test_booking_uses_number_the_code_was_sent_to() {
        let mut w = at_details_step();
        w.details_field = DetailsField::Phone;
        w.continue_step();
        assert!(w.otp.sending);

        // Edits during the send are ignored
        w.handle_key(key(KeyCode::Backspace));
        w.handle_key(key(KeyCode::Char('9')));
        w.handle_paste("123");
        assert_eq!(w.phone, "0501234567");

        w.on_otp_sent(OtpPurpose::Initial, Ok(SendOtpResponse { success: true, message: None }));
        let commands = w.handle_paste("1234");
        match &commands[..] {
            [WizardCommand::CreateBooking(request)] => {
                assert_eq!(Some(&request.phone), w.otp.phone_target.as_ref());
                assert_eq!(request.phone, "0501234567");
            }
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_request_phone_follows_send_target() {
        let mut w = at_otp_step();
        // Even if the live field drifted, the code's destination is used
        w.phone = "0509999999".into();
        let commands = w.handle_paste("1234");
        match &commands[..] {
            [WizardCommand::CreateBooking(request)] => assert_eq!(request.phone, "0501234567"),
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_month_keys_page_calendar_without_fetching() {
        let mut w = wizard();
        w.select_service(0);
        w.continue_step();
        let start = w.calendar.month();

        assert!(w.handle_key(key(KeyCode::PageDown)).is_empty());
        assert!(w.calendar.month() > start);
        assert!(w.handle_key(key(KeyCode::PageUp)).is_empty());
        assert_eq!(w.calendar.month(), start);
        // Cannot page before the current month
        assert!(w.handle_key(key(KeyCode::PageUp)).is_empty());
        assert_eq!(w.calendar.month(), start);
    }

    #[test]
    fn test_esc_dismisses_toast_before_going_back() {
        let mut w = at_details_step();
        w.continue_step();
        w.on_otp_sent(OtpPurpose::Initial, Err(ApiError::Network("offline".into())));
        assert!(w.toast.is_some());

        assert!(w.handle_key(key(KeyCode::Esc)).is_empty());
        assert!(w.toast.is_none());
        assert_eq!(w.step, Step::Details);

        w.handle_key(key(KeyCode::Esc));
        assert_eq!(w.step, Step::Time);
    }

    #[test]
    fn test_ctrl_keys_ignored() {
        let mut w = wizard();
        let event = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert!(w.handle_key(event).is_empty());
        assert_eq!(w.service_cursor, 0);
    }

    #[test]
    fn test_keyboard_happy_path() {
        let mut w = wizard();
        w.handle_key(key(KeyCode::Down));
        w.handle_key(key(KeyCode::Enter));
        assert_eq!(w.step, Step::Date);
        assert_eq!(w.selected_service.as_ref().map(|s| s.id.as_str()), Some("b"));

        w.handle_key(key(KeyCode::Right));
        let seq = load_slots_seq(&w.handle_key(key(KeyCode::Enter)));
        assert_eq!(w.selected_date, today().succ_opt());

        w.on_slots_loaded(seq, Ok(slots(&["09:00", "12:00"])));
        w.handle_key(key(KeyCode::Right));
        w.handle_key(key(KeyCode::Enter));
        assert_eq!(w.step, Step::Details);
        assert_eq!(w.selected_time.as_deref(), Some("12:00"));
    }
}
