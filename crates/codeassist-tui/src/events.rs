//! UI event types.
//!
//! Every input to the reducer is a `UiEvent`: terminal input, frame and
//! tick timing, request progress from the driver, and results of effects
//! the runtime executed.

use codeassist_core::core::events::ChatEvent;
use crossterm::event::Event as CrosstermEvent;

use crate::transcript::BlockId;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Animation and timer tick; the only event that triggers a redraw.
    Tick,
    /// Start of a loop iteration with the current terminal size.
    Frame { width: u16, height: u16 },
    /// Raw terminal input.
    Terminal(CrosstermEvent),
    /// Progress of the in-flight request.
    Chat(ChatEvent),
    /// A code block reached the clipboard.
    ClipboardCopied { block: BlockId },
}
