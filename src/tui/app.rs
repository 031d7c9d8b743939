//! TUI Application State
//!
//! Owns the booking wizard and executes the commands it returns: API
//! calls and timers run as tokio tasks that report back through the event
//! channel.

use super::events::{EventHandler, TuiEvent, keys};
use crate::api::BookingApi;
use crate::config::{BusinessConfig, Config};
use crate::i18n::Locale;
use crate::preferences::Preferences;
use crate::theme::Theme;
use crate::wizard::{BookingWizard, WizardCommand, WizardSettings};
use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Business page with a "book" call to action
    Landing,
    Booking,
}

pub struct App {
    pub mode: AppMode,
    pub wizard: BookingWizard,
    pub preferences: Preferences,
    prefs_path: PathBuf,
    pub business: BusinessConfig,
    settings: WizardSettings,
    api: Arc<dyn BookingApi>,
    pub should_quit: bool,
    /// Advances on every tick; drives spinners and the shake offset
    pub animation_frame: usize,
    /// One-line notice in the footer, e.g. a failed preferences write
    pub status_message: Option<String>,
    event_handler: EventHandler,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl App {
    pub fn new(
        api: Arc<dyn BookingApi>,
        config: &Config,
        preferences: Preferences,
        prefs_path: PathBuf,
    ) -> Self {
        let settings = WizardSettings::from(&config.booking);
        Self {
            mode: AppMode::Landing,
            wizard: BookingWizard::new(settings.clone(), today()),
            preferences,
            prefs_path,
            business: config.business.clone(),
            settings,
            api,
            should_quit: false,
            animation_frame: 0,
            status_message: None,
            event_handler: EventHandler::new(),
        }
    }

    pub fn event_sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.event_handler.sender()
    }

    pub async fn next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.next().await
    }

    pub fn try_next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.try_next()
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme()
    }

    pub fn locale(&self) -> Locale {
        self.preferences.locale
    }

    /// Leave the landing page and show the wizard
    pub fn start_booking(&mut self) {
        tracing::info!("Starting booking wizard {}", self.wizard.id());
        self.mode = AppMode::Booking;
        let commands = self.wizard.mount();
        self.dispatch(commands);
    }

    /// Replace the wizard with a fresh one. Pending results for the old
    /// wizard are dropped on arrival.
    fn reset_wizard(&mut self) {
        self.wizard = BookingWizard::new(self.settings.clone(), today());
        tracing::info!("Wizard reset, new id {}", self.wizard.id());
        let commands = self.wizard.mount();
        self.dispatch(commands);
    }

    pub fn handle_event(&mut self, event: TuiEvent) {
        if let Some(id) = event.wizard_id()
            && id != self.wizard.id()
        {
            tracing::debug!("Dropping event for discarded wizard {}", id);
            return;
        }

        let commands = match event {
            TuiEvent::Key(key) => {
                self.handle_key_event(key);
                return;
            }
            TuiEvent::Paste(text) => {
                if self.mode != AppMode::Booking {
                    return;
                }
                self.wizard.handle_paste(&text)
            }
            TuiEvent::Tick => {
                self.animation_frame = self.animation_frame.wrapping_add(1);
                return;
            }
            TuiEvent::Resize(_, _) => return,
            TuiEvent::Quit => {
                self.should_quit = true;
                return;
            }
            TuiEvent::ServicesLoaded { result, .. } => {
                self.wizard.on_services_loaded(result);
                Vec::new()
            }
            TuiEvent::SlotsLoaded { seq, result, .. } => {
                self.wizard.on_slots_loaded(seq, result);
                Vec::new()
            }
            TuiEvent::OtpSent {
                purpose, result, ..
            } => self.wizard.on_otp_sent(purpose, result),
            TuiEvent::BookingResolved { result, .. } => self.wizard.on_booking_resolved(result),
            TuiEvent::Timer { timer, .. } => self.wizard.on_timer(timer),
        };
        self.dispatch(commands);
    }

    fn handle_key_event(&mut self, event: KeyEvent) {
        if keys::is_quit(&event) {
            self.should_quit = true;
            return;
        }
        if keys::is_cycle_theme(&event) {
            self.cycle_theme();
            return;
        }
        if keys::is_cycle_locale(&event) {
            self.cycle_locale();
            return;
        }

        match self.mode {
            AppMode::Landing => {
                if keys::is_enter(&event) {
                    self.start_booking();
                } else if keys::is_cancel(&event) {
                    self.should_quit = true;
                }
            }
            AppMode::Booking => {
                let commands = self.wizard.handle_key(event);
                self.dispatch(commands);
            }
        }
    }

    fn cycle_theme(&mut self) {
        let next = self.preferences.theme().next();
        if let Err(e) = self.preferences.set_theme(&next, &self.prefs_path) {
            tracing::warn!("Failed to save theme: {:#}", e);
            self.status_message = Some(format!("Could not save theme: {}", e));
        }
    }

    fn cycle_locale(&mut self) {
        let next = self.preferences.locale.next();
        if let Err(e) = self.preferences.set_locale(next, &self.prefs_path) {
            tracing::warn!("Failed to save language: {:#}", e);
            self.status_message = Some(format!("Could not save language: {}", e));
        }
    }

    /// Run wizard commands. Remote calls and timers are spawned; their
    /// outcome comes back as a [`TuiEvent`] tagged with the wizard id.
    fn dispatch(&mut self, commands: Vec<WizardCommand>) {
        for command in commands {
            let wizard = self.wizard.id();
            let tx = self.event_sender();
            let api = Arc::clone(&self.api);

            match command {
                WizardCommand::LoadServices => {
                    tokio::spawn(async move {
                        let result = api.get_services().await;
                        let _ = tx.send(TuiEvent::ServicesLoaded { wizard, result });
                    });
                }
                WizardCommand::LoadSlots {
                    seq,
                    date,
                    service_id,
                } => {
                    tokio::spawn(async move {
                        let result = api.get_available_time_slots(date, &service_id).await;
                        let _ = tx.send(TuiEvent::SlotsLoaded {
                            wizard,
                            seq,
                            result,
                        });
                    });
                }
                WizardCommand::SendOtp { phone, purpose } => {
                    tokio::spawn(async move {
                        let result = api.send_otp(&phone).await;
                        let _ = tx.send(TuiEvent::OtpSent {
                            wizard,
                            purpose,
                            result,
                        });
                    });
                }
                WizardCommand::CreateBooking(request) => {
                    tokio::spawn(async move {
                        let result = api.create_booking(&request).await;
                        let _ = tx.send(TuiEvent::BookingResolved { wizard, result });
                    });
                }
                WizardCommand::Schedule { timer, after } => {
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(TuiEvent::Timer { wizard, timer });
                    });
                }
                WizardCommand::Reset => self.reset_wizard(),
                WizardCommand::Exit => {
                    self.mode = AppMode::Landing;
                }
            }
        }
    }
}
