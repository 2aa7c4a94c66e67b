//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects. The reducer calls `layout` with the same
//! inputs so the transcript area it hit-tests against is the one drawn.

use codeassist_core::core::conversation::Phase;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::input::{self, InputState};
use crate::state::AppState;
use crate::transcript;

pub const TITLE: &str = "AI Code Assistant";

/// Height of the title bar.
const TITLE_HEIGHT: u16 = 1;

/// Height of status line below input.
const STATUS_HEIGHT: u16 = 1;

/// Transcript horizontal margin (padding on each side).
pub const TRANSCRIPT_MARGIN: u16 = 1;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 4;

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub title: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Splits `area` into title, transcript, input and status regions.
pub fn layout(area: Rect, input: &InputState) -> AppLayout {
    let input_height = input::calculate_input_height(input, area.height);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(input_height),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    let transcript = Rect {
        x: chunks[1].x + TRANSCRIPT_MARGIN,
        width: chunks[1].width.saturating_sub(TRANSCRIPT_MARGIN * 2),
        ..chunks[1]
    };

    AppLayout {
        title: chunks[0],
        transcript,
        input: chunks[2],
        status: chunks[3],
    }
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let regions = layout(frame.area(), &app.input);

    render_title(frame, regions.title);
    transcript::render_transcript(
        &app.conversation,
        &app.transcript,
        app.tick,
        frame,
        regions.transcript,
    );
    input::render_input(
        &app.input,
        app.conversation.is_loading(),
        frame,
        regions.input,
    );
    render_status_line(app, frame, regions.status);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .style(Style::default().bg(Color::Rgb(30, 34, 42)));
    frame.render_widget(title, area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let phase = app.conversation.phase();
    let mut spans = Vec::new();

    if app.conversation.is_loading() {
        let spinner = SPINNER_FRAMES[(app.tick / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()];
        spans.push(Span::styled(spinner, Style::default().fg(Color::Green)));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        app.model.clone(),
        Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(phase.label(), phase_style(phase)));

    let hints = Line::from(Span::styled(
        "Ctrl+Y copy last block · Ctrl+C quit ",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Right);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
    frame.render_widget(Paragraph::new(hints), area);
}

fn phase_style(phase: Phase) -> Style {
    match phase {
        Phase::Idle => Style::default().fg(Color::DarkGray),
        Phase::Requesting | Phase::Streaming => Style::default().fg(Color::Green),
        Phase::Failed => Style::default().fg(Color::Red),
    }
}
