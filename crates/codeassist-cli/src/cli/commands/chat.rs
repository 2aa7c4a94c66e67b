//! Chat command handler.

use anyhow::{Context, Result};
use codeassist_core::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    codeassist_tui::run_interactive_chat(config)
        .await
        .context("interactive chat failed")
}
