//! Display-width aware text fitting for fixed-width columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `width` terminal cells, marking the cut with `…`.
pub fn fit(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// `fit`, then pad with spaces to exactly `width` cells.
pub fn pad(s: &str, width: usize) -> String {
    let fitted = fit(s, width);
    let used = UnicodeWidthStr::width(fitted.as_str());
    format!("{}{}", fitted, " ".repeat(width.saturating_sub(used)))
}
