//! TUI Rendering
//!
//! Landing page and wizard screens. Every screen is a centered card built
//! from owned `Line`s; right-to-left locales right-align the body text.

use super::app::{App, AppMode};
use crate::i18n::{self, Locale, Text, t};
use crate::theme::Palette;
use crate::utils::{fit_width, format_phone};
use crate::wizard::{BookingWizard, DetailsField, Step, group_by_period};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const CARD_WIDTH: u16 = 64;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Render the whole application
pub fn render(f: &mut Frame, app: &App) {
    let palette = app.theme().palette();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        f.area(),
    );

    match app.mode {
        AppMode::Landing => render_landing(f, app, &palette),
        AppMode::Booking => render_wizard(f, app, &palette),
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(v_chunks[1]);

    h_chunks[1]
}

fn body_alignment(locale: Locale) -> Alignment {
    if locale.is_rtl() {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

fn card<'a>(title: String, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(Span::styled(
            title,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

fn key_hint(key: &str, label: &str, palette: &Palette) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!("[{}] ", key),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{}  ", label), Style::default().fg(palette.muted)),
    ]
}

fn global_hints(locale: Locale, palette: &Palette) -> Vec<Span<'static>> {
    let mut spans = key_hint("F2", t(locale, Text::Theme), palette);
    spans.extend(key_hint("F3", locale.native_name(), palette));
    spans.extend(key_hint("Ctrl+C", t(locale, Text::Quit), palette));
    spans
}

// --- Landing ---

fn render_landing(f: &mut Frame, app: &App, palette: &Palette) {
    let locale = app.locale();
    let business = &app.business;
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            business.name.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            business.tagline.clone(),
            Style::default().fg(palette.muted),
        ))
        .centered(),
    );
    lines.push(Line::from(""));

    for highlight in &business.highlights {
        lines.push(Line::from(vec![
            Span::styled("  ✓ ", Style::default().fg(palette.success)),
            Span::raw(highlight.clone()),
        ]));
    }

    if !business.hours.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", t(locale, Text::Hours)),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for hours in &business.hours {
            lines.push(Line::from(format!("    {}", hours)));
        }
    }

    if let Some(address) = &business.address {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}: ", t(locale, Text::Address)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(address.clone()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            format!("  {}  ", t(locale, Text::BookNow)),
            Style::default()
                .fg(palette.background)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(Line::from(""));

    let mut footer = key_hint("Enter", t(locale, Text::BookNow), palette);
    footer.extend(global_hints(locale, palette));
    lines.push(Line::from(footer).centered());

    let area = centered(f.area(), CARD_WIDTH, card_height(&lines));
    let paragraph = Paragraph::new(lines)
        .block(card(format!(" {} ", business.name), palette))
        .alignment(body_alignment(locale))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

// --- Wizard ---

fn render_wizard(f: &mut Frame, app: &App, palette: &Palette) {
    let wizard = &app.wizard;
    let locale = app.locale();
    let step = wizard.step;
    let mut lines: Vec<Line<'static>> = Vec::new();

    if step != Step::Done {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                render_progress_dots(step),
                Style::default().fg(palette.accent),
            ))
            .centered(),
        );
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                t(locale, step.title()).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        lines.push(Line::from(""));
    }

    match step {
        Step::Service => render_services(&mut lines, wizard, locale, palette, app.animation_frame),
        Step::Date => render_calendar(&mut lines, wizard, locale, palette),
        Step::Time => render_time_slots(&mut lines, wizard, locale, palette, app.animation_frame),
        Step::Details => render_details(&mut lines, wizard, locale, palette, app.animation_frame),
        Step::Otp => render_otp(&mut lines, wizard, locale, palette, app.animation_frame),
        Step::Done => render_done(&mut lines, wizard, locale, palette),
    }

    if let Some(status) = &app.status_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  ! {}", status),
            Style::default().fg(palette.error),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(render_footer(wizard, locale, palette)).centered());

    let card_height = card_height(&lines);
    let toast_height = if wizard.toast.is_some() { 3 } else { 0 };
    let area = centered(f.area(), CARD_WIDTH, card_height + toast_height);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(toast_height)])
        .split(area);

    let title = if step == Step::Done {
        format!(" {} ", app.business.name)
    } else {
        format!(" {} ({}/{}) ", app.business.name, step.number(), Step::total())
    };

    let paragraph = Paragraph::new(lines)
        .block(card(title, palette))
        .alignment(body_alignment(locale))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, chunks[0]);

    if let Some(toast) = &wizard.toast {
        render_toast(f, chunks[1], &toast.message, palette);
    }
}

/// Rows needed for `lines` inside a bordered card, counting wrapped lines
fn card_height(lines: &[Line]) -> u16 {
    let inner = usize::from(CARD_WIDTH.saturating_sub(2)).max(1);
    let rows: usize = lines
        .iter()
        .map(|line| {
            let width = line.width();
            // Word wrap can break earlier than the column limit
            if width <= inner { 1 } else { width.div_ceil(inner) + 1 }
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

/// Filled dots for reached steps, the current one drawn wider
fn render_progress_dots(step: Step) -> String {
    let current = step.number();
    (1..=Step::total())
        .map(|i| match i.cmp(&current) {
            std::cmp::Ordering::Less => "●",
            std::cmp::Ordering::Equal => "━━",
            std::cmp::Ordering::Greater => "○",
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_footer(wizard: &BookingWizard, locale: Locale, palette: &Palette) -> Vec<Span<'static>> {
    let mut footer = Vec::new();
    match wizard.step {
        Step::Done => {
            footer.extend(key_hint("Enter", t(locale, Text::SubmitAnother), palette));
        }
        Step::Otp => {
            footer.extend(key_hint("Esc", t(locale, Text::Back), palette));
            if wizard.otp.can_resend {
                footer.extend(key_hint("r", t(locale, Text::ResendCode), palette));
            }
        }
        _ => {
            let esc = if wizard.toast.is_some() {
                Text::Dismiss
            } else {
                Text::Back
            };
            footer.extend(key_hint("Esc", t(locale, esc), palette));
            let label = t(locale, Text::Continue);
            if wizard.can_continue() {
                footer.extend(key_hint("Enter", label, palette));
            } else {
                footer.push(Span::styled(
                    format!("[Enter] {}  ", label),
                    Style::default().fg(palette.muted).add_modifier(Modifier::DIM),
                ));
            }
        }
    }
    footer.extend(global_hints(locale, palette));
    footer
}

fn render_toast(f: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let toast = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.error)),
    )
    .alignment(Alignment::Center);
    f.render_widget(Clear, area);
    f.render_widget(toast, area);
}

fn loading_line(locale: Locale, palette: &Palette, frame: usize) -> Line<'static> {
    Line::from(Span::styled(
        format!("{} {}", SPINNER[frame % SPINNER.len()], t(locale, Text::Loading)),
        Style::default().fg(palette.muted),
    ))
    .centered()
}

// --- Step renderers ---
// All functions produce Vec<Line<'static>> by using owned strings throughout.

fn render_services(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
    frame: usize,
) {
    if wizard.services_loading {
        lines.push(loading_line(locale, palette, frame));
        return;
    }

    if let Some(err) = &wizard.load_error {
        lines.push(
            Line::from(Span::styled(
                t(locale, Text::UnableToLoadServices).to_string(),
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(palette.muted))).centered());
        lines.push(Line::from(""));
        lines.push(Line::from(key_hint("r", t(locale, Text::TryAgain), palette)).centered());
        return;
    }

    lines.push(Line::from(Span::styled(
        format!("  {}", t(locale, Text::WhatToBook)),
        Style::default().fg(palette.muted),
    )));
    lines.push(Line::from(""));

    for (i, service) in wizard.services.iter().enumerate() {
        let focused = i == wizard.service_cursor;
        let selected = wizard
            .selected_service
            .as_ref()
            .is_some_and(|s| s.id == service.id);

        lines.push(Line::from(vec![
            Span::styled(
                if focused { " > " } else { "   " },
                Style::default().fg(palette.accent),
            ),
            Span::styled(
                if selected { "✓ " } else { "  " },
                Style::default().fg(palette.success),
            ),
            Span::styled(
                fit_width(service.name(locale), 34),
                Style::default().add_modifier(if focused {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                }),
            ),
            Span::styled(
                format!(
                    "  {} {} · ₪{}",
                    service.duration,
                    t(locale, Text::Minutes),
                    service.price
                ),
                Style::default().fg(palette.muted),
            ),
        ]));
        if focused && let Some(desc) = service.description(locale) {
            lines.push(Line::from(Span::styled(
                format!("     {}", fit_width(desc, 54)),
                Style::default().fg(palette.muted),
            )));
        }
    }
}

fn render_calendar(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
) {
    let calendar = &wizard.calendar;

    let prev = if calendar.can_go_previous() { "‹" } else { " " };
    lines.push(
        Line::from(vec![
            Span::styled(format!("{}  ", prev), Style::default().fg(palette.accent)),
            Span::styled(
                format!("{:^18}", i18n::format_month_year(calendar.month(), locale)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  ›", Style::default().fg(palette.accent)),
        ])
        .centered(),
    );
    lines.push(Line::from(""));

    let header: Vec<Span<'static>> = (0..7)
        .map(|d| {
            Span::styled(
                format!("{:^4}", fit_width(i18n::weekday_short(locale, d), 3)),
                Style::default().fg(palette.muted),
            )
        })
        .collect();
    lines.push(Line::from(header).centered());

    for week in calendar.cells().chunks(7) {
        let mut spans: Vec<Span<'static>> = week
            .iter()
            .map(|cell| match cell {
                None => Span::raw("    "),
                Some(date) => {
                    let day = chrono::Datelike::day(date);
                    let is_cursor = *date == calendar.cursor();
                    let is_selected = wizard.selected_date == Some(*date);
                    let mut style = Style::default();
                    if calendar.is_disabled(*date) {
                        style = style.fg(palette.muted).add_modifier(Modifier::DIM);
                    }
                    if calendar.is_today(*date) {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    if is_selected {
                        style = style
                            .fg(palette.background)
                            .bg(palette.accent)
                            .add_modifier(Modifier::BOLD);
                    } else if is_cursor {
                        style = style.fg(palette.accent).add_modifier(Modifier::BOLD);
                    }
                    let text = if is_cursor {
                        format!("[{:>2}]", day)
                    } else {
                        format!(" {:>2} ", day)
                    };
                    Span::styled(text, style)
                }
            })
            .collect();
        // Pad the last week so every row has the same width
        while spans.len() < 7 {
            spans.push(Span::raw("    "));
        }
        lines.push(Line::from(spans).centered());
    }

    lines.push(Line::from(""));
    if let Some(err) = calendar.error() {
        lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(palette.error))).centered());
    }
    let mut hints = key_hint("←→↑↓", "", palette);
    hints.extend(key_hint("PgUp/PgDn", "", palette));
    hints.extend(key_hint("Space", "✓", palette));
    lines.push(Line::from(hints).centered());
}

fn render_time_slots(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
    frame: usize,
) {
    if let (Some(service), Some(date)) = (&wizard.selected_service, wizard.selected_date) {
        lines.push(
            Line::from(Span::styled(
                format!(
                    "{} · {}",
                    fit_width(service.name(locale), 30),
                    i18n::format_date_short_with_weekday(date, locale)
                ),
                Style::default().fg(palette.muted),
            ))
            .centered(),
        );
        lines.push(Line::from(""));
    }

    if wizard.slots_loading {
        lines.push(loading_line(locale, palette, frame));
        return;
    }

    if wizard.slots.is_empty() {
        lines.push(
            Line::from(Span::styled(
                t(locale, Text::NoAvailableTimes).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        lines.push(
            Line::from(Span::styled(
                t(locale, Text::TryAnotherDate).to_string(),
                Style::default().fg(palette.muted),
            ))
            .centered(),
        );
        return;
    }

    lines.push(
        Line::from(Span::styled(
            format!("{} {}", wizard.slots.len(), t(locale, Text::Available)),
            Style::default().fg(palette.muted),
        ))
        .centered(),
    );

    for group in group_by_period(&wizard.slots) {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                format!("── {} ──", t(locale, group.period.label()).to_uppercase()),
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        for row in group.slots.chunks(4) {
            let spans: Vec<Span<'static>> = row
                .iter()
                .map(|(index, slot)| {
                    let is_cursor = *index == wizard.slot_cursor;
                    let is_selected = wizard.selected_time.as_deref() == Some(*slot);
                    let style = if is_selected {
                        Style::default()
                            .fg(palette.background)
                            .bg(palette.accent)
                            .add_modifier(Modifier::BOLD)
                    } else if is_cursor {
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let text = if is_cursor {
                        format!("[{}] ", slot)
                    } else {
                        format!(" {}  ", slot)
                    };
                    Span::styled(text, style)
                })
                .collect();
            lines.push(Line::from(spans).centered());
        }
    }
}

fn render_details(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
    frame: usize,
) {
    lines.push(Line::from(Span::styled(
        format!("  {}", t(locale, Text::EnterYourDetails)),
        Style::default().fg(palette.muted),
    )));
    lines.push(Line::from(""));

    render_summary(lines, wizard, locale, palette);
    lines.push(Line::from(""));

    let field = |label: Text, value: String, placeholder: &str, active: bool| {
        let mut spans = vec![Span::styled(
            format!("  {}: ", t(locale, label)),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if value.is_empty() {
            spans.push(Span::styled(
                placeholder.to_string(),
                Style::default().fg(palette.muted).add_modifier(Modifier::DIM),
            ));
        } else {
            spans.push(Span::raw(value));
        }
        if active {
            spans.push(Span::styled("▏", Style::default().fg(palette.accent)));
        }
        Line::from(spans)
    };

    lines.push(field(
        Text::FullName,
        wizard.name.clone(),
        t(locale, Text::EnterYourName),
        wizard.details_field == DetailsField::Name,
    ));
    lines.push(field(
        Text::WhatsappNumber,
        format_phone(&wizard.phone),
        "05X XXX XXXX",
        wizard.details_field == DetailsField::Phone,
    ));
    lines.push(Line::from(Span::styled(
        format!("  {}", t(locale, Text::VerificationHint)),
        Style::default().fg(palette.muted),
    )));

    if wizard.otp.sending {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                format!("{} {}", SPINNER[frame % SPINNER.len()], t(locale, Text::SendingCode)),
                Style::default().fg(palette.accent),
            ))
            .centered(),
        );
    }
}

fn render_summary(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
) {
    lines.push(Line::from(Span::styled(
        format!("  {}", t(locale, Text::YourAppointment)),
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
    )));

    let row = |label: Text, value: String| {
        Line::from(vec![
            Span::styled(
                format!("    {:<10}", t(locale, label)),
                Style::default().fg(palette.muted),
            ),
            Span::raw(value),
        ])
    };

    if let Some(service) = &wizard.selected_service {
        lines.push(row(Text::Service, fit_width(service.name(locale), 40)));
        lines.push(row(Text::Price, format!("₪{}", service.price)));
    }
    if let Some(date) = wizard.selected_date {
        lines.push(row(Text::Date, i18n::format_date_localized(date, locale)));
    }
    if let Some(time) = &wizard.selected_time {
        lines.push(row(Text::Time, time.clone()));
    }
}

fn render_otp(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
    frame: usize,
) {
    let otp = &wizard.otp;
    let target = otp.phone_target.as_deref().unwrap_or(&wizard.phone);

    lines.push(
        Line::from(Span::styled(
            t(locale, Text::EnterCode).to_string(),
            Style::default().fg(palette.muted),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            format_phone(target),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(Line::from(""));

    // Shake: nudge the row sideways on alternate frames
    let mut cells: Vec<Span<'static>> = Vec::new();
    if otp.shake {
        cells.push(Span::raw(if frame % 2 == 0 { "  " } else { "" }));
    }
    let input = &wizard.otp_input;
    for i in 0..input.len() {
        let focused = i == input.focus() && !input.is_disabled();
        let digit = input.cell(i).map(String::from).unwrap_or_else(|| " ".to_string());
        let style = if otp.success {
            Style::default().fg(palette.success).add_modifier(Modifier::BOLD)
        } else if otp.shake || otp.error.is_some() {
            Style::default().fg(palette.error).add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let text = if focused {
            format!("▕{}▏ ", digit)
        } else {
            format!("[{}] ", digit)
        };
        cells.push(Span::styled(text, style));
    }
    lines.push(Line::from(cells).centered());
    lines.push(Line::from(""));

    if otp.verifying {
        lines.push(
            Line::from(Span::styled(
                format!("{} {}", SPINNER[frame % SPINNER.len()], t(locale, Text::VerifyingCode)),
                Style::default().fg(palette.accent),
            ))
            .centered(),
        );
    } else if otp.success {
        lines.push(
            Line::from(Span::styled(
                format!("✓ {}", t(locale, Text::Verified)),
                Style::default().fg(palette.success).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        return;
    }

    if let Some(err) = &otp.error {
        lines.push(
            Line::from(Span::styled(
                err.clone(),
                Style::default().fg(palette.error),
            ))
            .centered(),
        );
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            t(locale, Text::DidntReceiveCode).to_string(),
            Style::default().fg(palette.muted),
        ))
        .centered(),
    );
    let resend = if otp.sending {
        Span::styled(
            t(locale, Text::Sending).to_string(),
            Style::default().fg(palette.muted),
        )
    } else if otp.can_resend {
        Span::styled(
            format!("[r] {}", t(locale, Text::ResendCode)),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("{} {}", otp.countdown, t(locale, Text::SecondsToResend)),
            Style::default().fg(palette.muted),
        )
    };
    lines.push(Line::from(resend).centered());
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", t(locale, Text::WhatsappHelp)),
        Style::default().fg(palette.muted),
    )));
}

fn render_done(
    lines: &mut Vec<Line<'static>>,
    wizard: &BookingWizard,
    locale: Locale,
    palette: &Palette,
) {
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            "✓",
            Style::default().fg(palette.success).add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            t(locale, Text::RequestSent).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            t(locale, Text::RequestSubmitted).to_string(),
            Style::default().fg(palette.muted),
        ))
        .centered(),
    );
    lines.push(Line::from(""));
    render_summary(lines, wizard, locale, palette);
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            t(locale, Text::NotifyWhatsapp).to_string(),
            Style::default().fg(palette.accent),
        ))
        .centered(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BookingApi, LocalizedText, Service};
    use crate::config::Config;
    use crate::preferences::Preferences;
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;

    struct NoApi;

    #[async_trait::async_trait]
    impl BookingApi for NoApi {
        async fn get_services(&self) -> crate::api::Result<Vec<Service>> {
            Ok(Vec::new())
        }
        async fn get_available_time_slots(
            &self,
            _date: chrono::NaiveDate,
            _service_id: &str,
        ) -> crate::api::Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn send_otp(&self, _phone: &str) -> crate::api::Result<crate::api::SendOtpResponse> {
            Ok(Default::default())
        }
        async fn create_booking(
            &self,
            _request: &crate::api::BookingRequest,
        ) -> crate::api::Result<crate::api::BookingResponse> {
            Ok(Default::default())
        }
    }

    fn test_app(locale: Locale) -> App {
        let prefs = Preferences {
            locale,
            ..Default::default()
        };
        App::new(
            Arc::new(NoApi),
            &Config::default(),
            prefs,
            std::env::temp_dir().join("appointly-render-test-prefs.toml"),
        )
    }

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(80, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_progress_dots() {
        assert_eq!(render_progress_dots(Step::Service), "━━ ○ ○ ○ ○");
        assert_eq!(render_progress_dots(Step::Time), "● ● ━━ ○ ○");
    }

    #[test]
    fn test_landing_shows_business_name() {
        let app = test_app(Locale::En);
        let text = screen_text(&app);
        assert!(text.contains("Appointly Studio"));
        assert!(text.contains("Book an appointment"));
    }

    #[test]
    fn test_service_step_lists_services() {
        let mut app = test_app(Locale::En);
        app.mode = AppMode::Booking;
        app.wizard.on_services_loaded(Ok(vec![Service {
            id: "cut".into(),
            names: LocalizedText {
                en: Some("Haircut".into()),
                ..Default::default()
            },
            descriptions: None,
            duration: 45,
            price: 120,
            active: true,
        }]));
        let text = screen_text(&app);
        assert!(text.contains("Select a service"));
        assert!(text.contains("Haircut"));
        assert!(text.contains("45 min"));
    }

    #[test]
    fn test_toast_footer_offers_dismiss() {
        let mut app = test_app(Locale::En);
        app.mode = AppMode::Booking;
        app.wizard.step = Step::Details;
        app.wizard.toast = Some(crate::wizard::Toast {
            id: 1,
            message: "Connection error. Please check your internet.".into(),
        });
        let text = screen_text(&app);
        assert!(text.contains("[Esc] Dismiss"));
        assert!(text.contains("Connection error"));

        app.wizard.dismiss_toast();
        let text = screen_text(&app);
        assert!(text.contains("[Esc] Back"));
        assert!(!text.contains("Connection error"));
    }

    #[test]
    fn test_otp_step_renders_in_hebrew() {
        let mut app = test_app(Locale::He);
        app.mode = AppMode::Booking;
        app.wizard.step = Step::Otp;
        app.wizard.otp.countdown = 42;
        let text = screen_text(&app);
        assert!(text.contains("42"));
    }
}
