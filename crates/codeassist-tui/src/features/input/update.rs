//! Input key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{CursorMove, InputState};

/// Outcome of routing a key to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The buffer consumed the key.
    Handled,
    /// The user asked to submit the buffer.
    Submit,
    /// Not an input key.
    Ignored,
}

/// Applies a key press to the input buffer.
///
/// Enter submits; Shift+Enter and Alt+Enter insert a newline. Editing stays
/// available while a request is in flight.
pub fn handle_key(input: &mut InputState, key: KeyEvent) -> KeyResult {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Enter if shift || alt => input.insert_newline(),
        KeyCode::Enter => return KeyResult::Submit,
        KeyCode::Char('j') if ctrl => input.insert_newline(),
        KeyCode::Char('u') if ctrl => input.clear(),
        KeyCode::Char(_) if ctrl => return KeyResult::Ignored,
        KeyCode::Char(ch) => input.insert_char(ch),
        KeyCode::Tab => input.insert_str("    "),
        KeyCode::Backspace => input.delete_prev_char(),
        KeyCode::Delete => input.delete_next_char(),
        KeyCode::Left => input.move_cursor(CursorMove::Back),
        KeyCode::Right => input.move_cursor(CursorMove::Forward),
        KeyCode::Home => input.move_cursor(CursorMove::Head),
        KeyCode::End => input.move_cursor(CursorMove::End),
        _ => return KeyResult::Ignored,
    }
    KeyResult::Handled
}

/// Inserts pasted text verbatim.
pub fn handle_paste(input: &mut InputState, text: &str) {
    input.insert_str(text);
}
