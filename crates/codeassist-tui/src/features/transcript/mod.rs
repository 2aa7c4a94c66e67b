//! Transcript feature: message list, code blocks, scrolling and copy.

mod code_block;
mod highlight;
mod render;
mod state;
mod style;
mod update;

pub use code_block::{COPIED_LABEL, COPY_LABEL, copy_text, language_label};
pub use render::{TranscriptLines, build_lines, render_transcript};
pub use state::{BlockId, COPY_FEEDBACK_DURATION, CopyFeedback, ScrollState, TranscriptState};
pub use update::{
    MOUSE_SCROLL_LINES, ScrollDirection, block_copy_text, handle_mouse, last_code_block, on_tick,
    page_size, scroll,
};
