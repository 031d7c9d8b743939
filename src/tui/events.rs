//! TUI Event System
//!
//! Terminal input, API results and wizard timers all arrive on one
//! unbounded channel. Wizard-bound events carry the id of the wizard that
//! issued the work so results for a discarded wizard can be dropped.

use crate::api::{ApiError, BookingResponse, SendOtpResponse, Service};
use crate::wizard::{OtpPurpose, Timer};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Key(KeyEvent),

    Paste(String),

    Resize(u16, u16),

    Tick,

    Quit,

    ServicesLoaded {
        wizard: Uuid,
        result: Result<Vec<Service>, ApiError>,
    },

    SlotsLoaded {
        wizard: Uuid,
        seq: u64,
        result: Result<Vec<String>, ApiError>,
    },

    OtpSent {
        wizard: Uuid,
        purpose: OtpPurpose,
        result: Result<SendOtpResponse, ApiError>,
    },

    BookingResolved {
        wizard: Uuid,
        result: Result<BookingResponse, ApiError>,
    },

    Timer {
        wizard: Uuid,
        timer: Timer,
    },
}

impl TuiEvent {
    /// Wizard the event is addressed to, if any
    pub fn wizard_id(&self) -> Option<Uuid> {
        match self {
            Self::ServicesLoaded { wizard, .. }
            | Self::SlotsLoaded { wizard, .. }
            | Self::OtpSent { wizard, .. }
            | Self::BookingResolved { wizard, .. }
            | Self::Timer { wizard, .. } => Some(*wizard),
            _ => None,
        }
    }
}

pub struct EventHandler {
    tx: mpsc::UnboundedSender<TuiEvent>,

    rx: mpsc::UnboundedReceiver<TuiEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.rx.recv().await
    }

    pub fn try_next(&mut self) -> Option<TuiEvent> {
        self.rx.try_recv().ok()
    }

    /// Forward crossterm input to `tx`, with a tick every 250ms so the
    /// screen redraws without input.
    pub fn start_terminal_listener(tx: mpsc::UnboundedSender<TuiEvent>) {
        use crossterm::event::{Event, EventStream, KeyEventKind};
        use futures::StreamExt;

        tokio::spawn(async move {
            let mut reader = EventStream::new();
            let tick_interval = std::time::Duration::from_millis(250);

            loop {
                let event = tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(event)) => Some(event),
                            Some(Err(e)) => {
                                tracing::warn!("Terminal event error: {}", e);
                                None
                            }
                            None => break,
                        }
                    }
                    _ = tokio::time::sleep(tick_interval) => None,
                };

                let sent = match event {
                    Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        tx.send(TuiEvent::Key(key))
                    }
                    Some(Event::Paste(text)) => tx.send(TuiEvent::Paste(text)),
                    Some(Event::Resize(w, h)) => tx.send(TuiEvent::Resize(w, h)),
                    Some(_) => Ok(()),
                    None => tx.send(TuiEvent::Tick),
                };
                if sent.is_err() {
                    break;
                }
            }
        });
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn key_matches(event: &KeyEvent, code: KeyCode, modifiers: KeyModifiers) -> bool {
    event.code == code && event.modifiers == modifiers
}

pub mod keys {
    use super::*;

    pub fn is_quit(event: &KeyEvent) -> bool {
        key_matches(event, KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    pub fn is_cycle_theme(event: &KeyEvent) -> bool {
        event.code == KeyCode::F(2)
    }

    pub fn is_cycle_locale(event: &KeyEvent) -> bool {
        event.code == KeyCode::F(3)
    }

    pub fn is_enter(event: &KeyEvent) -> bool {
        event.code == KeyCode::Enter && event.modifiers.is_empty()
    }

    pub fn is_cancel(event: &KeyEvent) -> bool {
        event.code == KeyCode::Esc
    }
}
