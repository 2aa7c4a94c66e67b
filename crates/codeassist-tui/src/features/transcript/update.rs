//! Transcript reducer helpers: scrolling, click hit-testing, copy lookup.

use std::time::Instant;

use codeassist_core::core::conversation::Conversation;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::code_block::copy_text;
use super::render::{build_lines, code_blocks};
use super::state::{BlockId, TranscriptState};

/// Lines moved per mouse wheel notch.
pub const MOUSE_SCROLL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

fn line_count(state: &TranscriptState, conversation: &Conversation) -> usize {
    build_lines(conversation, &state.copy_feedback, state.area.width as usize, 0)
        .lines
        .len()
}

/// Scrolls by `lines`, detaching from (or re-attaching to) the bottom.
pub fn scroll(
    state: &mut TranscriptState,
    conversation: &Conversation,
    direction: ScrollDirection,
    lines: usize,
) {
    let total = line_count(state, conversation);
    let height = state.area.height as usize;
    match direction {
        ScrollDirection::Up => state.scroll.scroll_up(lines, total, height),
        ScrollDirection::Down => state.scroll.scroll_down(lines, total, height),
    }
}

/// Rows moved by PageUp / PageDown.
pub fn page_size(state: &TranscriptState) -> usize {
    (state.area.height as usize).saturating_sub(1).max(1)
}

/// Handles wheel scrolling and header clicks.
///
/// Returns the block to copy when a code block header was clicked.
pub fn handle_mouse(
    state: &mut TranscriptState,
    conversation: &Conversation,
    mouse: MouseEvent,
) -> Option<BlockId> {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            scroll(state, conversation, ScrollDirection::Up, MOUSE_SCROLL_LINES);
            None
        }
        MouseEventKind::ScrollDown => {
            scroll(state, conversation, ScrollDirection::Down, MOUSE_SCROLL_LINES);
            None
        }
        MouseEventKind::Down(MouseButton::Left) => {
            header_at_screen(state, conversation, mouse.column, mouse.row)
        }
        _ => None,
    }
}

/// Maps a screen position to the code block header drawn there.
fn header_at_screen(
    state: &TranscriptState,
    conversation: &Conversation,
    column: u16,
    row: u16,
) -> Option<BlockId> {
    let area = state.area;
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    if !inside {
        return None;
    }

    let built = build_lines(conversation, &state.copy_feedback, area.width as usize, 0);
    let window = state.scroll.window(built.lines.len(), area.height as usize);
    let screen_row = (row - area.y) as usize;
    let line = (screen_row.checked_sub(window.padding)?) + window.offset;
    built.header_at(line)
}

/// Body text to copy for `id`, if that block exists.
pub fn block_copy_text(conversation: &Conversation, id: BlockId) -> Option<String> {
    let message = conversation.transcript().messages().get(id.message)?;
    code_blocks(id.message, message)
        .find(|(block, _, _)| *block == id)
        .map(|(_, _, code)| copy_text(&code))
}

/// The most recent code block in the transcript.
pub fn last_code_block(conversation: &Conversation) -> Option<BlockId> {
    conversation
        .transcript()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, message)| code_blocks(index, message).last().map(|(id, _, _)| id))
}

/// Per-tick housekeeping: follow new content and expire copy feedback.
pub fn on_tick(state: &mut TranscriptState, conversation: &Conversation, now: Instant) {
    state.scroll.sync_revision(conversation.revision());
    state.copy_feedback.expire(now);
}
