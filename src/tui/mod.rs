//! Terminal UI
//!
//! Ratatui front end for the booking wizard.

pub mod app;
pub mod events;
pub mod render;

pub use app::{App, AppMode};
pub use events::{EventHandler, TuiEvent};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the TUI until the user quits. The terminal is restored even when
/// the loop fails.
pub async fn run(mut app: App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    EventHandler::start_terminal_listener(app.event_sender());

    let result = event_loop(&mut terminal, &mut app).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        tracing::error!("Failed to restore terminal: {:#}", e);
    }
    result
}

async fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal
            .draw(|f| render::render(f, app))
            .context("Failed to draw frame")?;

        let Some(event) = app.next_event().await else {
            tracing::warn!("Event channel closed");
            break;
        };
        app.handle_event(event);

        // Drain whatever else is queued before the next frame
        while let Some(event) = app.try_next_event() {
            app.handle_event(event);
        }
    }
    tracing::info!("TUI exiting");
    Ok(())
}
