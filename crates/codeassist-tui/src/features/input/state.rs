//! User input state.
//!
//! A minimal multi-line edit buffer: text plus a cursor measured in chars.

/// Text shown when the input is empty.
pub const PLACEHOLDER: &str = "Ask a coding question...";

/// Cursor movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Forward,
    Back,
    Head,
    End,
}

/// Input buffer with a char-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    text: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position in chars from the start of the buffer.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Lines of the buffer (always at least one).
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Cursor as (row, col) in chars.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |line| line.chars().count());
        (row, col)
    }

    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert_str(byte_idx, &normalized);
        self.cursor += normalized.chars().count();
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Deletes the character before the cursor (Backspace).
    pub fn delete_prev_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index(self.cursor - 1);
        let end = self.byte_index(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    /// Deletes the character at the cursor (Delete).
    pub fn delete_next_char(&mut self) {
        if self.cursor >= self.char_len() {
            return;
        }
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn move_cursor(&mut self, movement: CursorMove) {
        match movement {
            CursorMove::Forward => self.cursor = (self.cursor + 1).min(self.char_len()),
            CursorMove::Back => self.cursor = self.cursor.saturating_sub(1),
            CursorMove::Head => {
                let (_, col) = self.cursor_row_col();
                self.cursor -= col;
            }
            CursorMove::End => {
                let rest: usize = self
                    .text
                    .chars()
                    .skip(self.cursor)
                    .take_while(|ch| *ch != '\n')
                    .count();
                self.cursor += rest;
            }
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(idx, _)| idx)
    }
}
