//! Write-only clipboard access for copying code blocks.
//!
//! Two transports, tried in order:
//! 1. OSC 52 terminal escape sequence (works over SSH)
//! 2. System clipboard via `arboard`

use std::fmt;
use std::io::Write;

use base64::Engine;

/// Clipboard writer with transport fallback.
pub struct Clipboard;

impl Clipboard {
    /// Copies `text` to the clipboard.
    ///
    /// # Errors
    /// Returns the system clipboard error when both transports fail.
    pub fn copy(text: &str) -> Result<(), ClipboardError> {
        match Self::copy_osc52(text) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(%err, "OSC 52 copy failed, trying system clipboard");
                Self::copy_system(text)
            }
        }
    }

    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(osc52_sequence(text).as_bytes())
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

/// Builds `ESC ] 52 ; c ; <base64> ESC \` targeting the system selection.
fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}

/// Clipboard operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// Writing the OSC 52 sequence failed.
    Osc52(String),
    /// System clipboard operation failed.
    System(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence_encodes_text() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x1b\\");
    }

    #[test]
    fn test_osc52_sequence_handles_multiline_code() {
        let seq = osc52_sequence("fn main() {}\n");
        assert!(seq.starts_with("\x1b]52;c;"));
        assert!(seq.ends_with("\x1b\\"));
        assert!(!seq[7..seq.len() - 2].contains('\n'));
    }

    #[test]
    fn test_error_display() {
        let err = ClipboardError::System("no display".to_string());
        assert_eq!(err.to_string(), "System clipboard failed: no display");
    }
}
