//! Conversation state machine.
//!
//! Owns the transcript and folds driver events into it. One request may be
//! in flight at a time; streamed deltas are accumulated and republished as
//! the content of the trailing model message.

use std::fmt;

use crate::core::events::ChatEvent;
use crate::core::transcript::{Message, Role, Transcript};
use crate::prompts::{FALLBACK_ERROR_TEXT, GREETING};

/// Request lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Submitted; no text received yet.
    Requesting,
    /// At least one delta received.
    Streaming,
    /// The request failed; cleared when it finishes.
    Failed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "ready",
            Phase::Requesting => "requesting…",
            Phase::Streaming => "streaming…",
            Phase::Failed => "error",
        }
    }
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Input is empty after trimming.
    Empty,
    /// A request is already in flight.
    InFlight,
}

impl fmt::Display for SubmitRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitRejected::Empty => write!(f, "input is empty"),
            SubmitRejected::InFlight => write!(f, "a request is already in flight"),
        }
    }
}

impl std::error::Error for SubmitRejected {}

/// Transcript plus the state of the current request.
#[derive(Debug, Clone)]
pub struct Conversation {
    transcript: Transcript,
    phase: Phase,
    loading: bool,
    /// Whether the current request has appended its model message.
    reply_open: bool,
    /// Whether the current request reported `Completed` or `Failed`.
    settled: bool,
    accumulator: String,
    revision: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Starts a session with the model greeting.
    pub fn new() -> Self {
        Self::with_transcript(Transcript::with_message(Message::model(GREETING)))
    }

    pub fn with_transcript(transcript: Transcript) -> Self {
        Self {
            transcript,
            phase: Phase::Idle,
            loading: false,
            reply_open: false,
            settled: false,
            accumulator: String::new(),
            revision: 0,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Bumped on every transcript change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while waiting for the first byte of a reply.
    pub fn show_typing_indicator(&self) -> bool {
        self.loading && self.transcript.last().is_some_and(|m| m.role == Role::User)
    }

    /// Records `input` as a user message and marks a request in flight.
    ///
    /// Returns the prompt to send. The input is stored and sent untrimmed.
    ///
    /// # Errors
    /// Rejects blank input and submissions while a request is in flight;
    /// nothing is recorded in either case.
    pub fn submit(&mut self, input: &str) -> Result<String, SubmitRejected> {
        if input.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.loading {
            return Err(SubmitRejected::InFlight);
        }

        self.transcript.append(Message::user(input));
        self.loading = true;
        self.reply_open = false;
        self.settled = false;
        self.accumulator.clear();
        self.phase = Phase::Requesting;
        self.bump();
        Ok(input.to_string())
    }

    /// Folds one driver event into the conversation.
    ///
    /// Returns whether the transcript changed.
    pub fn apply(&mut self, event: ChatEvent) -> bool {
        match event {
            ChatEvent::StreamOpened => {
                self.accumulator.clear();
                self.transcript.append(Message::model(""));
                self.reply_open = true;
                self.bump();
                true
            }
            ChatEvent::Delta { text } => {
                if !self.reply_open {
                    tracing::warn!("delta received before stream opened; ignoring");
                    return false;
                }
                self.accumulator.push_str(&text);
                if self.transcript.update_last(self.accumulator.as_str()).is_err() {
                    return false;
                }
                self.phase = Phase::Streaming;
                self.bump();
                true
            }
            ChatEvent::Completed => {
                self.settled = true;
                false
            }
            ChatEvent::Failed { .. } => {
                self.fail();
                true
            }
            ChatEvent::Finished => {
                // A driver that unwound never reported an outcome.
                let unsettled = self.loading && !self.settled;
                if unsettled {
                    tracing::warn!("request finished without an outcome; showing fallback");
                    self.fail();
                }
                self.loading = false;
                self.reply_open = false;
                self.phase = Phase::Idle;
                unsettled
            }
        }
    }

    /// Replaces the in-progress reply with the fallback text.
    fn fail(&mut self) {
        let fallback = Message::model(FALLBACK_ERROR_TEXT);
        if self.reply_open {
            if self.transcript.replace_last(fallback.clone()).is_err() {
                self.transcript.append(fallback);
            }
        } else {
            self.transcript.append(fallback);
            self.reply_open = true;
        }
        self.accumulator.clear();
        self.settled = true;
        self.phase = Phase::Failed;
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::core::driver::{run_request, spawn_request};
    use crate::core::driver::test_support::{FakeClient, Script, drain, request};
    use crate::providers::{ProviderError, TextChunk};

    fn delta(text: &str) -> ChatEvent {
        ChatEvent::Delta {
            text: text.to_string(),
        }
    }

    fn failed() -> ChatEvent {
        ChatEvent::Failed {
            error: ProviderError::timeout("timed out"),
        }
    }

    fn contents(conversation: &Conversation) -> Vec<(Role, &str)> {
        conversation
            .transcript()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    #[test]
    fn test_new_session_has_greeting() {
        let conversation = Conversation::new();
        assert_eq!(contents(&conversation), vec![(Role::Model, GREETING)]);
        assert_eq!(conversation.phase(), Phase::Idle);
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_submit_appends_user_message_untrimmed() {
        let mut conversation = Conversation::new();
        let prompt = conversation.submit("  hi  ").unwrap();

        assert_eq!(prompt, "  hi  ");
        assert_eq!(conversation.transcript().last(), Some(&Message::user("  hi  ")));
        assert!(conversation.is_loading());
        assert_eq!(conversation.phase(), Phase::Requesting);
        assert!(conversation.show_typing_indicator());
    }

    #[test]
    fn test_blank_submit_is_rejected_silently() {
        let mut conversation = Conversation::new();
        let revision = conversation.revision();

        assert_eq!(conversation.submit("   \n"), Err(SubmitRejected::Empty));
        assert_eq!(conversation.transcript().len(), 1);
        assert_eq!(conversation.revision(), revision);
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_submit_while_loading_is_rejected() {
        let mut conversation = Conversation::new();
        conversation.submit("first").unwrap();

        assert_eq!(conversation.submit("second"), Err(SubmitRejected::InFlight));
        assert_eq!(conversation.transcript().len(), 2);
    }

    #[test]
    fn test_streamed_deltas_accumulate_into_model_message() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();

        conversation.apply(ChatEvent::StreamOpened);
        assert_eq!(conversation.transcript().last(), Some(&Message::model("")));
        assert!(!conversation.show_typing_indicator());
        assert_eq!(conversation.phase(), Phase::Requesting);

        conversation.apply(delta("Hel"));
        assert_eq!(conversation.phase(), Phase::Streaming);
        conversation.apply(delta("lo"));
        conversation.apply(ChatEvent::Completed);
        assert!(conversation.is_loading());
        conversation.apply(ChatEvent::Finished);

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, "Hello"),
            ]
        );
        assert!(!conversation.is_loading());
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[test]
    fn test_each_delta_shows_running_concatenation() {
        let mut conversation = Conversation::new();
        conversation.submit("greet").unwrap();
        conversation.apply(ChatEvent::StreamOpened);

        let mut seen = Vec::new();
        for chunk in ["Hel", "lo ", "world"] {
            assert!(conversation.apply(delta(chunk)));
            seen.push(conversation.transcript().last().unwrap().content.clone());
        }

        assert_eq!(seen, vec!["Hel", "Hello ", "Hello world"]);
    }

    #[test]
    fn test_mid_stream_failure_replaces_partial_text() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();
        conversation.apply(ChatEvent::StreamOpened);
        conversation.apply(delta("par"));

        assert!(conversation.apply(failed()));
        assert_eq!(conversation.phase(), Phase::Failed);
        conversation.apply(ChatEvent::Finished);

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, FALLBACK_ERROR_TEXT),
            ]
        );
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_failure_before_open_keeps_user_message() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();

        conversation.apply(failed());
        conversation.apply(ChatEvent::Finished);

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, FALLBACK_ERROR_TEXT),
            ]
        );
    }

    #[test]
    fn test_failure_after_zero_chunks_shows_fallback() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();
        conversation.apply(ChatEvent::StreamOpened);

        conversation.apply(failed());
        conversation.apply(ChatEvent::Finished);

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, FALLBACK_ERROR_TEXT),
            ]
        );
        assert!(!conversation.is_loading());
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[test]
    fn test_finished_without_outcome_shows_fallback() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();
        conversation.apply(ChatEvent::StreamOpened);
        conversation.apply(delta("half a rep"));

        assert!(conversation.apply(ChatEvent::Finished));
        assert_eq!(
            conversation.transcript().last(),
            Some(&Message::model(FALLBACK_ERROR_TEXT))
        );
        assert_eq!(conversation.transcript().len(), 3);
        assert!(!conversation.is_loading());
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[test]
    fn test_revision_tracks_transcript_changes() {
        let mut conversation = Conversation::new();
        let start = conversation.revision();
        let snapshot = conversation.transcript().clone();

        conversation.submit("hi").unwrap();
        conversation.apply(ChatEvent::StreamOpened);
        conversation.apply(delta("a"));
        assert_eq!(conversation.revision(), start + 3);
        assert!(!conversation.transcript().same_as(&snapshot));

        let revision = conversation.revision();
        assert!(!conversation.apply(ChatEvent::Completed));
        assert!(!conversation.apply(ChatEvent::Finished));
        assert_eq!(conversation.revision(), revision);
    }

    #[test]
    fn test_delta_before_open_is_ignored() {
        let mut conversation = Conversation::new();
        conversation.submit("hi").unwrap();

        assert!(!conversation.apply(delta("stray")));
        assert_eq!(conversation.transcript().last(), Some(&Message::user("hi")));
    }

    #[test]
    fn test_can_submit_again_after_finish() {
        let mut conversation = Conversation::new();
        conversation.submit("one").unwrap();
        conversation.apply(failed());
        conversation.apply(ChatEvent::Finished);

        assert!(conversation.submit("two").is_ok());
        assert_eq!(conversation.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_driver_events_fold_into_transcript() {
        let client = FakeClient::texts(&["```rust\n", "fn main() {}\n", "```"]);
        let mut conversation = Conversation::new();
        let prompt = conversation.submit("show me main").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        run_request(&client, request(&prompt), tx).await;
        for event in drain(&mut rx) {
            conversation.apply(event);
        }

        assert_eq!(
            conversation.transcript().last(),
            Some(&Message::model("```rust\nfn main() {}\n```"))
        );
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_driver_failure_folds_into_fallback() {
        let client = FakeClient::new(Script::Chunks(vec![
            Ok(TextChunk::text("partial")),
            Err(ProviderError::api_error("INTERNAL", "boom")),
        ]));
        let mut conversation = Conversation::new();
        let prompt = conversation.submit("hi").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        run_request(&client, request(&prompt), tx).await;
        for event in drain(&mut rx) {
            conversation.apply(event);
        }

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, FALLBACK_ERROR_TEXT),
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_driver_folds_into_fallback() {
        let client = Arc::new(FakeClient::new(Script::PanicsMidStream(vec![
            TextChunk::text("partial"),
        ])));
        let mut conversation = Conversation::new();
        let prompt = conversation.submit("hi").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ = spawn_request(client, request(&prompt), tx).await;
        for event in drain(&mut rx) {
            conversation.apply(event);
        }

        assert_eq!(
            contents(&conversation),
            vec![
                (Role::Model, GREETING),
                (Role::User, "hi"),
                (Role::Model, FALLBACK_ERROR_TEXT),
            ]
        );
        assert!(!conversation.is_loading());
        assert_eq!(conversation.phase(), Phase::Idle);
    }
}
