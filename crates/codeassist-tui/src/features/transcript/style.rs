//! Transcript colors and styles.

use ratatui::style::{Color, Modifier, Style};

/// Icon shown before model messages.
pub const MODEL_ICON: &str = "✦";
/// Icon shown after user message labels.
pub const USER_ICON: &str = "👤";
/// Bar drawn at the trailing edge of user message lines.
pub const USER_BAR: &str = "▐";

pub const CODE_BG: Color = Color::Rgb(43, 48, 59);
pub const CODE_HEADER_BG: Color = Color::Rgb(30, 34, 42);
pub const CODE_FG: Color = Color::Rgb(192, 197, 206);
pub const USER_BG: Color = Color::Rgb(30, 58, 138);

pub fn model_label() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

pub fn user_label() -> Style {
    Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD)
}

pub fn model_text() -> Style {
    Style::default()
}

pub fn user_text() -> Style {
    Style::default().fg(Color::White).bg(USER_BG)
}

pub fn user_bar() -> Style {
    Style::default().fg(Color::Blue)
}

pub fn code_header() -> Style {
    Style::default()
        .fg(Color::Gray)
        .bg(CODE_HEADER_BG)
        .add_modifier(Modifier::BOLD)
}

pub fn copy_button() -> Style {
    Style::default().fg(Color::Gray).bg(CODE_HEADER_BG)
}

pub fn copied_button() -> Style {
    Style::default()
        .fg(Color::Green)
        .bg(CODE_HEADER_BG)
        .add_modifier(Modifier::BOLD)
}

pub fn code_plain() -> Style {
    Style::default().fg(CODE_FG).bg(CODE_BG)
}

pub fn typing_dot(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
