//! Input feature: prompt editing and submission.

mod render;
mod state;
mod update;

pub use render::{calculate_input_height, render_input};
pub use state::{CursorMove, InputState, PLACEHOLDER};
pub use update::{KeyResult, handle_key, handle_paste};
