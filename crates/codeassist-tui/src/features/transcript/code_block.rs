//! Code block view: header with language and copy button, highlighted body.

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::highlight::highlight_code;
use super::style;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

/// Text placed on the clipboard for a code block body.
pub fn copy_text(code: &str) -> String {
    code.trim().to_string()
}

/// Capitalizes the first letter of a fence tag for display.
pub fn language_label(language: &str) -> String {
    let mut chars = language.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a code block as a header row followed by highlighted body rows.
///
/// Every row is padded to `width` so the background forms a solid box.
pub fn render_code_block(
    language: &str,
    code: &str,
    copied: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.push(header_line(language, copied, width));

    let body = copy_text(code);
    let highlighted = highlight_code(&body, language);
    if highlighted.is_empty() {
        lines.push(pad_line(vec![Span::styled(" ", style::code_plain())], width));
    }
    for spans in highlighted {
        let mut row = vec![Span::styled(" ", style::code_plain())];
        row.extend(spans);
        lines.push(pad_line(row, width));
    }
    lines
}

fn header_line(language: &str, copied: bool, width: usize) -> Line<'static> {
    let label = format!(" {}", language_label(language));
    let (button, button_style) = if copied {
        (format!("✓ {COPIED_LABEL} "), style::copied_button())
    } else {
        (format!("{COPY_LABEL} "), style::copy_button())
    };

    let gap = width.saturating_sub(label.width() + button.width()).max(1);
    Line::from(vec![
        Span::styled(label, style::code_header()),
        Span::styled(" ".repeat(gap), style::code_header()),
        Span::styled(button, button_style),
    ])
}

fn pad_line(mut spans: Vec<Span<'static>>, width: usize) -> Line<'static> {
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style::code_plain()));
    }
    Line::from(spans)
}
