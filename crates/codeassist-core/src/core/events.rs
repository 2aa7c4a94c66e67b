//! Events emitted by the streaming request driver.

use crate::providers::ProviderError;

/// One step of a streaming request, in emission order.
///
/// A request produces `StreamOpened`, zero or more `Delta`s, exactly one
/// terminal event (`Completed` or `Failed`), then `Finished`. `Failed` may
/// arrive without a preceding `StreamOpened` when the request never opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The response stream is open; a model message should be started.
    StreamOpened,
    /// A non-empty text fragment to append to the model message.
    Delta { text: String },
    /// The stream ended normally.
    Completed,
    /// The request or stream failed.
    Failed { error: ProviderError },
    /// The request is over, whatever its outcome.
    Finished,
}

impl ChatEvent {
    /// Short name for log records.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::StreamOpened => "stream_opened",
            ChatEvent::Delta { .. } => "delta",
            ChatEvent::Completed => "completed",
            ChatEvent::Failed { .. } => "failed",
            ChatEvent::Finished => "finished",
        }
    }
}
