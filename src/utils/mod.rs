//! Utility modules for common functionality

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten `s` to at most `max_cols` terminal columns, ending with `…`
/// when something was cut. Wide characters are never split.
pub fn fit_width(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    let budget = max_cols - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Group a local phone number for display: `0501234567` → `050 123 4567`
pub fn format_phone(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(3)
        .take(2)
        .map(|c| c.iter().collect::<String>())
        .chain((chars.len() > 6).then(|| chars[6..].iter().collect()))
        .filter(|s: &String| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
