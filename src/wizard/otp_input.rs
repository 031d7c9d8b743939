//! One-time code entry
//!
//! A fixed row of single-digit cells with a focus cursor. Completion is
//! reported once; the widget stays silent until [`OtpInput::reset`].

use zeroize::Zeroize;

#[derive(Debug, Clone)]
pub struct OtpInput {
    cells: Vec<Option<char>>,
    focus: usize,
    disabled: bool,
    submitted: bool,
}

impl OtpInput {
    pub fn new(length: usize) -> Self {
        let length = length.max(1);
        Self {
            cells: vec![None; length],
            focus: 0,
            disabled: false,
            submitted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Digits entered so far, in cell order
    pub fn code(&self) -> String {
        self.cells.iter().flatten().collect()
    }

    /// Type a digit into the focused cell and advance.
    ///
    /// Non-digits are ignored. Returns the full code the first time every
    /// cell is filled.
    pub fn input_digit(&mut self, c: char) -> Option<String> {
        if self.disabled || !c.is_ascii_digit() {
            return None;
        }
        self.cells[self.focus] = Some(c);
        if self.focus + 1 < self.cells.len() {
            self.focus += 1;
        }
        self.check_complete()
    }

    /// Clear the focused cell, or step back and clear the previous one
    /// when the focused cell is already empty.
    pub fn backspace(&mut self) {
        if self.disabled {
            return;
        }
        if self.cells[self.focus].is_some() {
            self.cells[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
            self.cells[self.focus] = None;
        }
    }

    pub fn move_left(&mut self) {
        if !self.disabled && self.focus > 0 {
            self.focus -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if !self.disabled && self.focus + 1 < self.cells.len() {
            self.focus += 1;
        }
    }

    /// Distribute pasted digits from the first cell.
    ///
    /// Non-digit characters are dropped and extra digits ignored. Cells
    /// past the pasted digits keep their content.
    pub fn paste(&mut self, text: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        let digits: Vec<char> = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(self.cells.len())
            .collect();
        if digits.is_empty() {
            return None;
        }
        for (cell, digit) in self.cells.iter_mut().zip(&digits) {
            *cell = Some(*digit);
        }
        self.focus = digits.len().min(self.cells.len() - 1);
        self.check_complete()
    }

    /// Clear all cells, focus the first one and re-arm completion
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.focus = 0;
        self.submitted = false;
    }

    fn check_complete(&mut self) -> Option<String> {
        if self.submitted || !self.is_complete() {
            return None;
        }
        self.submitted = true;
        Some(self.code())
    }
}

impl Drop for OtpInput {
    fn drop(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.zeroize();
        }
    }
}
