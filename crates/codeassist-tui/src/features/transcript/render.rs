//! Transcript view.
//!
//! Builds the full list of display lines from the conversation. The reducer
//! uses the same builder for scroll math and click hit-testing, so what is
//! drawn and what is clickable never disagree.

use codeassist_core::core::conversation::Conversation;
use codeassist_core::core::segments::{Segment, segments};
use codeassist_core::core::transcript::{Message, Role};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::code_block::render_code_block;
use super::state::{BlockId, CopyFeedback, TranscriptState};
use super::style;
use crate::common::text::wrap_text;

/// Columns of indentation for message bodies.
const BODY_INDENT: usize = 2;

/// Ticks per typing-indicator step.
const TYPING_TICKS_PER_STEP: usize = 6;

/// A clickable code block header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderHit {
    pub line: usize,
    pub block: BlockId,
}

/// Rendered transcript lines plus code header positions.
#[derive(Debug, Default)]
pub struct TranscriptLines {
    pub lines: Vec<Line<'static>>,
    pub headers: Vec<HeaderHit>,
}

impl TranscriptLines {
    /// Returns the block whose header sits on `line`, if any.
    pub fn header_at(&self, line: usize) -> Option<BlockId> {
        self.headers
            .iter()
            .find(|hit| hit.line == line)
            .map(|hit| hit.block)
    }
}

/// Code blocks of `message` in order, paired with their ids.
pub fn code_blocks(
    message_index: usize,
    message: &Message,
) -> impl Iterator<Item = (BlockId, String, String)> {
    segments(&message.content)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::CodeBlock { language, code } => Some((language, code)),
            Segment::Prose(_) => None,
        })
        .enumerate()
        .map(move |(block, (language, code))| {
            (
                BlockId {
                    message: message_index,
                    block,
                },
                language,
                code,
            )
        })
}

/// Builds every transcript line for a pane `width` columns wide.
pub fn build_lines(
    conversation: &Conversation,
    feedback: &CopyFeedback,
    width: usize,
    tick: usize,
) -> TranscriptLines {
    let mut out = TranscriptLines::default();

    for (index, message) in conversation.transcript().iter().enumerate() {
        if index > 0 {
            out.lines.push(Line::default());
        }
        match message.role {
            Role::Model => push_model_message(&mut out, index, message, feedback, width),
            Role::User => push_user_message(&mut out, index, message, feedback, width),
        }
    }

    if conversation.show_typing_indicator() {
        out.lines.push(Line::default());
        out.lines.push(typing_indicator(tick));
    }

    out
}

fn push_model_message(
    out: &mut TranscriptLines,
    index: usize,
    message: &Message,
    feedback: &CopyFeedback,
    width: usize,
) {
    out.lines.push(Line::from(Span::styled(
        format!("{} Gemini", style::MODEL_ICON),
        style::model_label(),
    )));

    let body_width = width.saturating_sub(BODY_INDENT).max(1);
    let indent = " ".repeat(BODY_INDENT);
    let mut block = 0;

    for segment in segments(&message.content) {
        match segment {
            Segment::Prose(text) => {
                for line in wrap_text(&text, body_width) {
                    out.lines.push(Line::from(vec![
                        Span::raw(indent.clone()),
                        Span::styled(line, style::model_text()),
                    ]));
                }
            }
            Segment::CodeBlock { language, code } => {
                let id = BlockId {
                    message: index,
                    block,
                };
                block += 1;
                push_code_block(out, id, &language, &code, feedback, body_width, &indent);
            }
        }
    }
}

fn push_user_message(
    out: &mut TranscriptLines,
    index: usize,
    message: &Message,
    feedback: &CopyFeedback,
    width: usize,
) {
    out.lines.push(
        Line::from(Span::styled(
            format!("You {}", style::USER_ICON),
            style::user_label(),
        ))
        .alignment(Alignment::Right),
    );

    // Leave room for the padding spaces and the trailing bar.
    let bubble_width = (width * 3 / 4).saturating_sub(3).max(1);
    let mut block = 0;

    for segment in segments(&message.content) {
        match segment {
            Segment::Prose(text) => {
                for line in wrap_text(&text, bubble_width) {
                    out.lines.push(
                        Line::from(vec![
                            Span::styled(format!(" {line} "), style::user_text()),
                            Span::styled(style::USER_BAR, style::user_bar()),
                        ])
                        .alignment(Alignment::Right),
                    );
                }
            }
            Segment::CodeBlock { language, code } => {
                let id = BlockId {
                    message: index,
                    block,
                };
                block += 1;
                let indent = " ".repeat(width.saturating_sub(bubble_width + 1));
                push_code_block(out, id, &language, &code, feedback, bubble_width + 1, &indent);
            }
        }
    }
}

fn push_code_block(
    out: &mut TranscriptLines,
    id: BlockId,
    language: &str,
    code: &str,
    feedback: &CopyFeedback,
    width: usize,
    indent: &str,
) {
    out.headers.push(HeaderHit {
        line: out.lines.len(),
        block: id,
    });
    for line in render_code_block(language, code, feedback.is_copied(id), width) {
        let mut spans = vec![Span::raw(indent.to_string())];
        spans.extend(line.spans);
        out.lines.push(Line::from(spans));
    }
}

/// Three dots pulsing in sequence.
fn typing_indicator(tick: usize) -> Line<'static> {
    let active = (tick / TYPING_TICKS_PER_STEP) % 3;
    let mut spans = vec![Span::styled(
        format!("{} ", style::MODEL_ICON),
        style::model_label(),
    )];
    for dot in 0..3 {
        spans.push(Span::styled("● ", style::typing_dot(dot == active)));
    }
    Line::from(spans)
}

/// Draws the visible slice of the transcript into `area`.
pub fn render_transcript(
    conversation: &Conversation,
    state: &TranscriptState,
    tick: usize,
    frame: &mut Frame,
    area: Rect,
) {
    let built = build_lines(conversation, &state.copy_feedback, area.width as usize, tick);
    let height = area.height as usize;
    let window = state.scroll.window(built.lines.len(), height);

    let mut visible: Vec<Line<'static>> = Vec::with_capacity(height);
    visible.extend(std::iter::repeat_n(Line::default(), window.padding));
    visible.extend(
        built
            .lines
            .into_iter()
            .skip(window.offset)
            .take(height - window.padding.min(height)),
    );

    frame.render_widget(Paragraph::new(visible), area);
}

#[cfg(test)]
mod tests {
    use codeassist_core::core::events::ChatEvent;
    use codeassist_core::core::transcript::Transcript;

    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn all_text(built: &TranscriptLines) -> Vec<String> {
        built.lines.iter().map(text).collect()
    }

    fn conversation_with(messages: Vec<Message>) -> Conversation {
        let mut transcript = Transcript::new();
        for message in messages {
            transcript.append(message);
        }
        Conversation::with_transcript(transcript)
    }

    #[test]
    fn test_greeting_renders_with_model_icon() {
        let built = build_lines(&Conversation::new(), &CopyFeedback::default(), 80, 0);
        let lines = all_text(&built);
        assert!(lines[0].starts_with("✦"));
        assert!(lines[1].contains("Hello! I am your AI Code Assistant."));
    }

    #[test]
    fn test_user_messages_are_right_aligned() {
        let conversation = conversation_with(vec![Message::user("hi there")]);
        let built = build_lines(&conversation, &CopyFeedback::default(), 40, 0);

        assert!(
            built
                .lines
                .iter()
                .all(|line| line.alignment == Some(Alignment::Right))
        );
        assert!(all_text(&built)[0].contains("👤"));
        assert!(all_text(&built)[1].contains("hi there"));
    }

    #[test]
    fn test_code_block_header_positions_are_recorded() {
        let conversation = conversation_with(vec![
            Message::user("q"),
            Message::model("Try:\n```python\nprint(1)\n```\nor\n```sh\necho 1\n```"),
        ]);
        let built = build_lines(&conversation, &CopyFeedback::default(), 40, 0);
        let lines = all_text(&built);

        assert_eq!(built.headers.len(), 2);
        let first = built.headers[0];
        assert_eq!(
            first.block,
            BlockId {
                message: 1,
                block: 0
            }
        );
        assert!(lines[first.line].contains("Python"));
        assert!(lines[first.line + 1].contains("print(1)"));
        assert!(lines[built.headers[1].line].contains("Sh"));
        assert_eq!(built.header_at(first.line), Some(first.block));
        assert_eq!(built.header_at(first.line + 1), None);
    }

    #[test]
    fn test_copied_feedback_changes_only_that_block() {
        let conversation = conversation_with(vec![Message::model(
            "```a\n1\n```\n```b\n2\n```",
        )]);
        let mut feedback = CopyFeedback::default();
        feedback.mark(
            BlockId {
                message: 0,
                block: 1,
            },
            std::time::Instant::now(),
        );
        let built = build_lines(&conversation, &feedback, 40, 0);
        let lines = all_text(&built);

        assert!(lines[built.headers[0].line].contains("Copy"));
        assert!(!lines[built.headers[0].line].contains("Copied!"));
        assert!(lines[built.headers[1].line].contains("Copied!"));
    }

    #[test]
    fn test_typing_indicator_only_while_waiting() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();
        let built = build_lines(&conversation, &CopyFeedback::default(), 40, 0);
        assert!(all_text(&built).last().unwrap().contains("●"));

        conversation.apply(ChatEvent::StreamOpened);
        let built = build_lines(&conversation, &CopyFeedback::default(), 40, 0);
        assert!(!all_text(&built).last().unwrap().contains("●"));
    }

    #[test]
    fn test_typing_indicator_pulses() {
        let first = typing_indicator(0);
        let later = typing_indicator(TYPING_TICKS_PER_STEP);
        assert_ne!(first, later);
        assert_eq!(typing_indicator(0), typing_indicator(TYPING_TICKS_PER_STEP * 3));
    }

    #[test]
    fn test_code_blocks_iterates_ids_in_order() {
        let message = Message::model("```rs\na\n```\ntext\n```py\nb\n```");
        let blocks: Vec<_> = code_blocks(4, &message).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1].0,
            BlockId {
                message: 4,
                block: 1
            }
        );
        assert_eq!(blocks[1].1, "py");
        assert_eq!(blocks[1].2, "b");
    }
}
