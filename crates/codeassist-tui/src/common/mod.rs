//! Shared helpers used across TUI features.

pub mod clipboard;
pub mod text;

pub use clipboard::{Clipboard, ClipboardError};
