//! Text utilities for fitting names into terminal columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate a string to fit within a maximum display width.
/// Uses unicode-width for correct handling of CJK and other wide characters.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let target_width = max_width.saturating_sub(3); // Reserve space for "..."
    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > target_width {
            break;
        }
        used += ch_width;
        end = idx + ch.len_utf8();
    }

    format!("{}...", &s[..end])
}

/// Truncate or right-pad to exactly `width` display columns.
pub fn fit_width(s: &str, width: usize) -> String {
    let mut fitted = truncate_str(s, width);
    let pad = width.saturating_sub(fitted.width());
    fitted.extend(std::iter::repeat_n(' ', pad));
    fitted
}

/// First line of a possibly multi-line message, truncated to `max_width`.
pub fn first_line(msg: &str, max_width: usize) -> String {
    let line = msg.lines().next().unwrap_or(msg);
    truncate_str(line, max_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_ascii() {
        assert_eq!(truncate_str("Margherita pizza", 10), "Margher...");
        assert_eq!(truncate_str("Soup", 10), "Soup");
        assert_eq!(truncate_str("Espresso", 8), "Espresso");
    }

    #[test]
    fn test_truncate_str_wide_chars() {
        // CJK: 1 char = 2 columns
        assert_eq!(truncate_str("寿司", 10), "寿司");
        assert_eq!(truncate_str("天ぷら定食セット", 10), "天ぷら...");
    }

    #[test]
    fn test_truncate_str_empty() {
        assert_eq!(truncate_str("", 10), "");
        assert_eq!(truncate_str("", 0), "");
    }

    #[test]
    fn test_fit_width_pads() {
        assert_eq!(fit_width("Tea", 6), "Tea   ");
        assert_eq!(fit_width("寿司", 6), "寿司  ");
        assert_eq!(fit_width("Lemonade", 6), "Lem...");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Could not save\nretry later", 40), "Could not save");
        assert_eq!(first_line("Name already taken", 10), "Name al...");
    }
}
