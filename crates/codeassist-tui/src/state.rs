//! Application state.
//!
//! ```text
//! AppState
//! ├── conversation: Conversation  (transcript, phase, loading flag)
//! ├── input: InputState           (prompt being edited)
//! └── transcript: TranscriptState (scroll, copy feedback, pane area)
//! ```

use codeassist_core::core::conversation::Conversation;

use crate::input::InputState;
use crate::transcript::TranscriptState;

/// Everything the reducer mutates and the renderer reads.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Model name shown in the status line.
    pub model: String,
    pub conversation: Conversation,
    pub input: InputState,
    pub transcript: TranscriptState,
    /// Tick counter driving animations.
    pub tick: usize,
}

impl AppState {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_conversation(model, Conversation::new())
    }

    pub fn with_conversation(model: impl Into<String>, conversation: Conversation) -> Self {
        Self {
            should_quit: false,
            model: model.into(),
            conversation,
            input: InputState::new(),
            transcript: TranscriptState::default(),
            tick: 0,
        }
    }

    /// Whether animations or timers need the fast tick rate.
    pub fn needs_fast_tick(&self) -> bool {
        self.conversation.is_loading() || self.transcript.copy_feedback.has_pending()
    }
}
