//! UI effect types.
//!
//! Effects are commands returned by the reducer for the runtime to execute.
//! They cover I/O and task spawning only, which keeps the reducer pure.

use crate::transcript::BlockId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,
    /// Start a streaming request for `prompt`.
    SendPrompt { prompt: String },
    /// Put a code block body on the clipboard.
    CopyToClipboard { block: BlockId, text: String },
}
