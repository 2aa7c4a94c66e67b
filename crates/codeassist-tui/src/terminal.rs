//! Terminal lifecycle management.
//!
//! Raw mode, the alternate screen, mouse capture and bracketed paste are
//! released on normal exit (via `Drop` on the runtime) and on panic.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enables raw mode, enters the alternate screen and creates the terminal.
///
/// Call `install_panic_hook()` first so a panic restores the terminal.
///
/// # Errors
/// Returns an error if the terminal cannot be configured.
pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

/// Enables bracketed paste and mouse capture for the event loop.
///
/// # Errors
/// Returns an error if the escape sequences cannot be written.
pub fn enable_input_features() -> Result<()> {
    execute!(io::stdout(), EnableBracketedPaste, EnableMouseCapture)
        .context("Failed to enable input features")
}

/// Disables what `enable_input_features()` turned on.
///
/// # Errors
/// Returns an error if the escape sequences cannot be written.
pub fn disable_input_features() -> Result<()> {
    execute!(io::stdout(), DisableMouseCapture, DisableBracketedPaste)
        .context("Failed to disable input features")
}

/// Restores the terminal. Idempotent.
///
/// # Errors
/// Returns an error if the alternate screen or raw mode cannot be left.
pub fn restore_terminal() -> Result<()> {
    // Must happen while still in raw mode; harmless if never enabled.
    let _ = execute!(io::stdout(), DisableMouseCapture, DisableBracketedPaste);

    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")
}

/// Installs a panic hook that restores the terminal before printing the panic.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
