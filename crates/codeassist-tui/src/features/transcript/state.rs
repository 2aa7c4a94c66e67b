//! Transcript view state: scroll position, copy feedback, viewport.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

/// How long a block shows "Copied!" after a copy.
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

/// Identifies a code block by message index and its order within the message.
///
/// Stable for the session: the transcript only appends, and a streaming
/// message only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub message: usize,
    pub block: usize,
}

/// Per-block "Copied!" indicators with independent expiry.
#[derive(Debug, Clone, Default)]
pub struct CopyFeedback {
    copied_at: HashMap<BlockId, Instant>,
}

impl CopyFeedback {
    /// Starts (or restarts) the indicator for `id`.
    pub fn mark(&mut self, id: BlockId, now: Instant) {
        self.copied_at.insert(id, now);
    }

    pub fn is_copied(&self, id: BlockId) -> bool {
        self.copied_at.contains_key(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.copied_at.is_empty()
    }

    /// Drops indicators older than `COPY_FEEDBACK_DURATION`.
    ///
    /// Returns whether any indicator reverted.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.copied_at.len();
        self.copied_at
            .retain(|_, copied_at| now.saturating_duration_since(*copied_at) < COPY_FEEDBACK_DURATION);
        self.copied_at.len() != before
    }
}

/// Which slice of the transcript is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    /// Index of the first rendered line.
    pub offset: usize,
    /// Blank rows above the content when it is shorter than the viewport.
    pub padding: usize,
}

/// Scroll position that follows new content until the user scrolls away.
#[derive(Debug, Clone)]
pub struct ScrollState {
    offset: usize,
    follow: bool,
    seen_revision: Option<u64>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
            seen_revision: None,
        }
    }
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Re-enables following when the conversation changed since last seen.
    ///
    /// Returns whether the revision was new.
    pub fn sync_revision(&mut self, revision: u64) -> bool {
        if self.seen_revision == Some(revision) {
            return false;
        }
        self.seen_revision = Some(revision);
        self.follow = true;
        true
    }

    pub fn scroll_up(&mut self, lines: usize, total: usize, height: usize) {
        let current = self.window(total, height).offset;
        self.offset = current.saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize, total: usize, height: usize) {
        let max = max_offset(total, height);
        let current = self.window(total, height).offset;
        self.offset = (current + lines).min(max);
        self.follow = self.offset >= max;
    }

    /// Resolves the visible window for `total` lines in a `height`-row viewport.
    pub fn window(&self, total: usize, height: usize) -> VisibleWindow {
        let max = max_offset(total, height);
        let offset = if self.follow { max } else { self.offset.min(max) };
        VisibleWindow {
            offset,
            padding: height.saturating_sub(total),
        }
    }
}

fn max_offset(total: usize, height: usize) -> usize {
    total.saturating_sub(height)
}

/// Transcript view state owned by the reducer.
#[derive(Debug, Clone, Default)]
pub struct TranscriptState {
    pub scroll: ScrollState,
    pub copy_feedback: CopyFeedback,
    /// Screen area of the transcript pane, updated every frame.
    pub area: Rect,
}
