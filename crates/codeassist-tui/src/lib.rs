//! Full-screen chat TUI for the code assistant.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use codeassist_core::config::Config;
use codeassist_core::providers::gemini::{GeminiClient, GeminiConfig};
pub use features::{input, transcript};
pub use runtime::TuiRuntime;

/// Runs the interactive chat loop.
///
/// # Errors
/// Returns an error if stderr is not a terminal, the provider config is
/// invalid, or terminal I/O fails.
pub async fn run_interactive_chat(config: &Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Chat mode requires a terminal.\n\
             Use `codeassist exec --prompt '...'` for non-interactive execution."
        );
    }

    let client = GeminiClient::new(GeminiConfig::from_config(config)?);
    tracing::info!(model = %config.model, "starting interactive chat");

    let mut runtime = TuiRuntime::new(client, &config.model, config.effective_system_prompt())?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
