//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::input::KeyResult;
use crate::state::AppState;
use crate::transcript::{BlockId, ScrollDirection};
use crate::{input, render, transcript};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tick = app.tick.wrapping_add(1);
            transcript::on_tick(&mut app.transcript, &app.conversation, Instant::now());
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(app, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Chat(chat_event) => {
            tracing::trace!(event = chat_event.name(), "chat event");
            app.conversation.apply(chat_event);
            vec![]
        }
        UiEvent::ClipboardCopied { block } => {
            app.transcript.copy_feedback.mark(block, Instant::now());
            vec![]
        }
    }
}

fn handle_frame(app: &mut AppState, width: u16, height: u16) {
    let regions = render::layout(Rect::new(0, 0, width, height), &app.input);
    app.transcript.area = regions.transcript;
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Mouse(mouse) => {
            match transcript::handle_mouse(&mut app.transcript, &app.conversation, mouse) {
                Some(block) => copy_block(app, block),
                None => vec![],
            }
        }
        Event::Paste(text) => {
            input::handle_paste(&mut app.input, &text);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind == KeyEventKind::Release {
        return vec![];
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return vec![UiEffect::Quit],
        KeyCode::Char('y') if ctrl => {
            return match transcript::last_code_block(&app.conversation) {
                Some(block) => copy_block(app, block),
                None => vec![],
            };
        }
        KeyCode::PageUp => {
            let lines = transcript::page_size(&app.transcript);
            transcript::scroll(
                &mut app.transcript,
                &app.conversation,
                ScrollDirection::Up,
                lines,
            );
            return vec![];
        }
        KeyCode::PageDown => {
            let lines = transcript::page_size(&app.transcript);
            transcript::scroll(
                &mut app.transcript,
                &app.conversation,
                ScrollDirection::Down,
                lines,
            );
            return vec![];
        }
        _ => {}
    }

    match input::handle_key(&mut app.input, key) {
        KeyResult::Submit => submit_input(app),
        KeyResult::Handled | KeyResult::Ignored => vec![],
    }
}

/// Submits the input buffer. The buffer is kept when the submission is rejected.
fn submit_input(app: &mut AppState) -> Vec<UiEffect> {
    match app.conversation.submit(app.input.text()) {
        Ok(prompt) => {
            app.input.clear();
            vec![UiEffect::SendPrompt { prompt }]
        }
        Err(rejected) => {
            tracing::debug!(%rejected, "submission ignored");
            vec![]
        }
    }
}

fn copy_block(app: &AppState, block: BlockId) -> Vec<UiEffect> {
    match transcript::block_copy_text(&app.conversation, block) {
        Some(text) => vec![UiEffect::CopyToClipboard { block, text }],
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use codeassist_core::core::conversation::Phase;
    use codeassist_core::core::events::ChatEvent;
    use codeassist_core::providers::{ProviderError, ProviderErrorKind};
    use codeassist_core::prompts::FALLBACK_ERROR_TEXT;
    use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

    use super::*;

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(ch: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char(ch),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for ch in text.chars() {
            update(app, key(KeyCode::Char(ch)));
        }
    }

    fn app() -> AppState {
        let mut app = AppState::new("gemini-test");
        update(
            &mut app,
            UiEvent::Frame {
                width: 80,
                height: 24,
            },
        );
        app
    }

    fn last_content(app: &AppState) -> String {
        app.conversation
            .transcript()
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut app = app();
        type_text(&mut app, "How do I reverse a list?");

        let effects = update(&mut app, key(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::SendPrompt {
                prompt: "How do I reverse a list?".to_string()
            }]
        );
        assert!(app.input.is_empty());
        assert_eq!(app.conversation.phase(), Phase::Requesting);
    }

    #[test]
    fn test_blank_submit_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert_eq!(app.input.text(), "   ");
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[test]
    fn test_submit_while_loading_keeps_input() {
        let mut app = app();
        type_text(&mut app, "first");
        update(&mut app, key(KeyCode::Enter));
        type_text(&mut app, "second");

        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert_eq!(app.input.text(), "second");
        assert_eq!(app.conversation.transcript().len(), 2);
    }

    #[test]
    fn test_chat_events_stream_into_transcript() {
        let mut app = app();
        type_text(&mut app, "hi");
        update(&mut app, key(KeyCode::Enter));

        update(&mut app, UiEvent::Chat(ChatEvent::StreamOpened));
        update(
            &mut app,
            UiEvent::Chat(ChatEvent::Delta {
                text: "Hel".to_string(),
            }),
        );
        assert_eq!(last_content(&app), "Hel");
        update(
            &mut app,
            UiEvent::Chat(ChatEvent::Delta {
                text: "lo".to_string(),
            }),
        );
        update(&mut app, UiEvent::Chat(ChatEvent::Completed));
        update(&mut app, UiEvent::Chat(ChatEvent::Finished));

        assert_eq!(last_content(&app), "Hello");
        assert!(!app.conversation.is_loading());
    }

    #[test]
    fn test_failure_shows_fallback() {
        let mut app = app();
        type_text(&mut app, "hi");
        update(&mut app, key(KeyCode::Enter));
        update(
            &mut app,
            UiEvent::Chat(ChatEvent::Failed {
                error: ProviderError::new(ProviderErrorKind::Timeout, "timed out"),
            }),
        );
        update(&mut app, UiEvent::Chat(ChatEvent::Finished));
        assert_eq!(last_content(&app), FALLBACK_ERROR_TEXT);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        assert_eq!(update(&mut app, ctrl('c')), vec![UiEffect::Quit]);
    }

    #[test]
    fn test_ctrl_y_copies_last_code_block() {
        let mut app = app();
        assert!(update(&mut app, ctrl('y')).is_empty());

        type_text(&mut app, "q");
        update(&mut app, key(KeyCode::Enter));
        update(&mut app, UiEvent::Chat(ChatEvent::StreamOpened));
        update(
            &mut app,
            UiEvent::Chat(ChatEvent::Delta {
                text: "Use:\n```python\nprint(x)\n```".to_string(),
            }),
        );

        let effects = update(&mut app, ctrl('y'));
        assert_eq!(
            effects,
            vec![UiEffect::CopyToClipboard {
                block: BlockId {
                    message: 2,
                    block: 0
                },
                text: "print(x)".to_string(),
            }]
        );
    }

    #[test]
    fn test_clipboard_copied_marks_feedback() {
        let mut app = app();
        let block = BlockId {
            message: 0,
            block: 0,
        };
        update(&mut app, UiEvent::ClipboardCopied { block });
        assert!(app.transcript.copy_feedback.is_copied(block));
    }

    #[test]
    fn test_header_click_requests_copy() {
        let mut app = app();
        type_text(&mut app, "q");
        update(&mut app, key(KeyCode::Enter));
        update(&mut app, UiEvent::Chat(ChatEvent::StreamOpened));
        update(
            &mut app,
            UiEvent::Chat(ChatEvent::Delta {
                text: "```rust\nfn main() {}\n```".to_string(),
            }),
        );

        let area = app.transcript.area;
        let built = transcript::build_lines(
            &app.conversation,
            &app.transcript.copy_feedback,
            area.width as usize,
            0,
        );
        let padding = (area.height as usize).saturating_sub(built.lines.len());
        let row = area.y as usize + padding + built.headers[0].line;

        let effects = update(
            &mut app,
            UiEvent::Terminal(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: area.x + 2,
                row: row as u16,
                modifiers: KeyModifiers::NONE,
            })),
        );
        assert_eq!(
            effects,
            vec![UiEffect::CopyToClipboard {
                block: BlockId {
                    message: 2,
                    block: 0
                },
                text: "fn main() {}".to_string(),
            }]
        );
    }

    #[test]
    fn test_paste_inserts_into_input() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::Terminal(Event::Paste("line one\nline two".to_string())),
        );
        assert_eq!(app.input.text(), "line one\nline two");
    }

    #[test]
    fn test_frame_sets_transcript_area() {
        let app = app();
        assert_eq!(app.transcript.area, Rect::new(1, 1, 78, 19));
    }
}
