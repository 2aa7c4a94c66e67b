//! Text utilities for TUI rendering.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Removes ANSI escapes and expands tabs to four spaces.
///
/// Tabs have no unicode width, so leaving them in breaks column math.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    if s.contains('\x1b') || s.contains('\t') {
        Cow::Owned(s.replace('\x1b', "").replace('\t', "    "))
    } else {
        Cow::Borrowed(s)
    }
}

/// Wraps `text` to `width` columns, preserving explicit line breaks.
///
/// Breaks at spaces where possible; words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let text = sanitize_for_display(text);
    text.split('\n')
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Wraps a single line (no `\n`) to `width` columns.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.width() <= width {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_inclusive(' ') {
        let word_width = word.width();
        if current_width + word_width <= width {
            current.push_str(word);
            current_width += word_width;
            continue;
        }

        if !current.is_empty() {
            out.push(current.trim_end().to_string());
            current.clear();
            current_width = 0;
        }

        if word.trim_end().width() <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    if !current.is_empty() || out.is_empty() {
        out.push(current.trim_end().to_string());
    }
    out
}
