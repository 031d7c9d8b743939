//! Month calendar for date selection
//!
//! Sunday-first grid over one month at a time. Days before today are
//! never selectable, and navigation cannot go to a month before the one
//! containing today. An optional allow-list restricts selectable days
//! further when the caller knows availability in advance.
//!
//! The allow-list, loading/error state and `retry` are hooks for a caller
//! that fetches availability per month. The booking wizard does not: its
//! backend only answers per-day slot queries, so every future day stays
//! open and month changes are only logged.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::HashSet;

/// First and last day of a displayed month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthBounds {
    pub fn of(date: NaiveDate) -> Self {
        let first = first_of_month(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        Self { first, last }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

#[derive(Debug, Clone)]
pub struct CalendarGrid {
    today: NaiveDate,
    month: NaiveDate,
    cursor: NaiveDate,
    allowed: Option<HashSet<NaiveDate>>,
    loading: bool,
    error: Option<String>,
}

impl CalendarGrid {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            month: first_of_month(today),
            cursor: today,
            allowed: None,
            loading: false,
            error: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// First day of the displayed month
    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn bounds(&self) -> MonthBounds {
        MonthBounds::of(self.month)
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn can_go_previous(&self) -> bool {
        self.month > first_of_month(self.today)
    }

    /// Show the previous month, unless it lies entirely in the past.
    ///
    /// Returns the new month's bounds so availability can be re-fetched.
    pub fn previous_month(&mut self) -> Option<MonthBounds> {
        if !self.can_go_previous() {
            return None;
        }
        let month = self.month.checked_sub_months(Months::new(1))?;
        Some(self.show_month(month))
    }

    pub fn next_month(&mut self) -> Option<MonthBounds> {
        let month = self.month.checked_add_months(Months::new(1))?;
        Some(self.show_month(month))
    }

    fn show_month(&mut self, month: NaiveDate) -> MonthBounds {
        self.month = first_of_month(month);
        self.cursor = self.month.max(self.today);
        self.bounds()
    }

    /// Day cells for the displayed month, with `None` padding before the
    /// first day so that column 0 is Sunday.
    pub fn cells(&self) -> Vec<Option<NaiveDate>> {
        let bounds = self.bounds();
        let padding = bounds.first.weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Option<NaiveDate>> = vec![None; padding];
        cells.extend(bounds.first.iter_days().take_while(|d| *d <= bounds.last).map(Some));
        cells
    }

    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        if date < self.today {
            return true;
        }
        match &self.allowed {
            Some(allowed) => !allowed.contains(&date),
            None => false,
        }
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        date == self.today
    }

    /// Move the keyboard cursor by `days`, never before today.
    ///
    /// The displayed month follows the cursor. Returns the new bounds when
    /// the month changed.
    pub fn move_cursor(&mut self, days: i64) -> Option<MonthBounds> {
        let target = if days >= 0 {
            self.cursor.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
        }?;
        self.cursor = target.max(self.today);

        let month = first_of_month(self.cursor);
        if month != self.month {
            self.month = month;
            return Some(self.bounds());
        }
        None
    }

    /// Put the cursor on `date` if it is selectable
    pub fn focus(&mut self, date: NaiveDate) {
        if !self.is_disabled(date) {
            self.cursor = date;
            self.month = first_of_month(date);
        }
    }

    /// Cursor date, if it can be selected
    pub fn selectable_cursor(&self) -> Option<NaiveDate> {
        (!self.is_disabled(self.cursor)).then_some(self.cursor)
    }

    /// Restrict selectable days; `None` lifts the restriction
    pub fn set_allowed_dates(&mut self, dates: Option<Vec<NaiveDate>>) {
        self.allowed = dates.map(|d| d.into_iter().collect());
        self.loading = false;
        self.error = None;
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clear a failed availability load and report which month to fetch again
    pub fn retry(&mut self) -> Option<MonthBounds> {
        self.error.take()?;
        self.loading = true;
        Some(self.bounds())
    }
}
