//! Exec command handler.
//!
//! Sends one prompt through the same driver as the TUI and prints the reply
//! once it completes. A failed request prints only the fallback reply and
//! still exits successfully; partial text is discarded and the details go to
//! the log.

use std::io::{Write, stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use codeassist_core::config::Config;
use codeassist_core::core::driver;
use codeassist_core::core::events::ChatEvent;
use codeassist_core::prompts::FALLBACK_ERROR_TEXT;
use codeassist_core::providers::GenerateRequest;
use codeassist_core::providers::gemini::{GeminiClient, GeminiConfig};
use tokio::sync::mpsc;

pub async fn run(prompt: &str, config: &Config) -> Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt must not be empty");
    }

    let client = GeminiClient::new(GeminiConfig::from_config(config)?);
    let request = GenerateRequest {
        model: config.model.clone(),
        prompt: prompt.to_string(),
        system_instruction: config.effective_system_prompt().to_string(),
    };

    tracing::info!(model = %request.model, "exec request started");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = driver::spawn_request(Arc::new(client), request, tx);

    let mut reply = String::new();
    let mut outcome = None;
    while let Some(event) = rx.recv().await {
        match event {
            ChatEvent::Delta { text } => reply.push_str(&text),
            ChatEvent::Completed => outcome = Some(Ok(())),
            ChatEvent::Failed { error } => outcome = Some(Err(error)),
            ChatEvent::Finished => break,
            ChatEvent::StreamOpened => {}
        }
    }

    let mut out = stdout();
    match outcome {
        Some(Ok(())) => {
            tracing::info!(chars = reply.len(), "exec request completed");
            writeln!(out, "{reply}")?;
        }
        Some(Err(error)) => {
            tracing::warn!(kind = %error.kind, "exec request failed; printing fallback");
            writeln!(out, "{FALLBACK_ERROR_TEXT}")?;
        }
        None => {
            tracing::warn!("exec request ended without an outcome; printing fallback");
            writeln!(out, "{FALLBACK_ERROR_TEXT}")?;
        }
    }
    out.flush()?;

    handle.await.context("request task failed")?;
    Ok(())
}
