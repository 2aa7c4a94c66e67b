//! Input feature view.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::state::{InputState, PLACEHOLDER};

/// Minimum height of the input area (lines, including borders).
const INPUT_HEIGHT_MIN: u16 = 3;

/// Maximum number of text rows before the input scrolls.
const INPUT_ROWS_MAX: u16 = 8;

/// Height of the input area for the current buffer.
pub fn calculate_input_height(input: &InputState, terminal_height: u16) -> u16 {
    let rows = (input.lines().len() as u16).clamp(1, INPUT_ROWS_MAX);
    let max_height = (terminal_height / 2).max(INPUT_HEIGHT_MIN);
    (rows + 2).clamp(INPUT_HEIGHT_MIN, max_height)
}

/// Renders the input box and places the terminal cursor.
pub fn render_input(input: &InputState, loading: bool, frame: &mut Frame, area: Rect) {
    let border_color = if loading {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let hint = if loading {
        " waiting for reply… "
    } else {
        " Enter send · Shift+Enter newline "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title_bottom(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    let inner = block.inner(area);

    let (cursor_row, cursor_col) = input.cursor_row_col();
    let visible_rows = inner.height.max(1) as usize;
    let scroll = cursor_row.saturating_sub(visible_rows - 1);

    let lines: Vec<Line<'static>> = if input.is_empty() {
        vec![Line::from(Span::styled(
            PLACEHOLDER,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        input
            .lines()
            .into_iter()
            .skip(scroll)
            .take(visible_rows)
            .map(|line| Line::from(line.to_string()))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);

    let line = input.lines().get(cursor_row).copied().unwrap_or("");
    let prefix: String = line.chars().take(cursor_col).collect();
    let x = inner.x + (prefix.width() as u16).min(inner.width.saturating_sub(1));
    let y = inner.y + (cursor_row - scroll) as u16;
    frame.set_cursor_position(Position::new(x, y));
}
