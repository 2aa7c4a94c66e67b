//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! Async results arrive on two channels drained every iteration:
//! - the chat channel, fed by the request driver
//! - the inbox, fed by effect handlers

mod inbox;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use codeassist_core::core::driver::{self, ModelClient};
use codeassist_core::core::events::ChatEvent;
use codeassist_core::providers::GenerateRequest;
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use tokio::sync::mpsc;

use crate::common::Clipboard;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::Tui;
use crate::{render, terminal, update};

/// Target frame rate while streaming or animating (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle (no request running, no pending timers).
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop or panic.
pub struct TuiRuntime<C> {
    terminal: Tui,
    pub state: AppState,
    client: Arc<C>,
    system_instruction: String,
    chat_tx: mpsc::UnboundedSender<ChatEvent>,
    chat_rx: mpsc::UnboundedReceiver<ChatEvent>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    /// Last terminal event, for fast ticks while the user interacts.
    last_terminal_event: Instant,
}

impl<C: ModelClient + 'static> TuiRuntime<C> {
    /// Creates the runtime and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(
        client: C,
        model: impl Into<String>,
        system_instruction: impl Into<String>,
    ) -> Result<Self> {
        // Before entering the alternate screen.
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(model),
            client: Arc::new(client),
            system_instruction: system_instruction.into(),
            chat_tx,
            chat_rx,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout first, so hit-testing in this batch sees the current size.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }

                // Only Tick triggers render; other events batch into the next tick.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }

                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.needs_fast_tick() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(chat_event) = self.chat_rx.try_recv() {
            events.push(UiEvent::Chat(chat_event));
        }
        while let Ok(ui_event) = self.inbox_rx.try_recv() {
            events.push(ui_event);
        }

        // Block until the next tick only when there is nothing to process.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SendPrompt { prompt } => {
                let request = GenerateRequest {
                    model: self.state.model.clone(),
                    prompt,
                    system_instruction: self.system_instruction.clone(),
                };
                tracing::info!(model = %request.model, "sending prompt");
                driver::spawn_request(Arc::clone(&self.client), request, self.chat_tx.clone());
            }
            UiEffect::CopyToClipboard { block, text } => match Clipboard::copy(&text) {
                Ok(()) => {
                    let _ = self.inbox_tx.send(UiEvent::ClipboardCopied { block });
                }
                Err(error) => {
                    tracing::warn!(%error, "failed to copy code block");
                }
            },
        }
    }
}

impl<C> Drop for TuiRuntime<C> {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
