//! Ordered message store with copy-on-write snapshots.
//!
//! Cloning a `Transcript` is cheap and yields a snapshot that later
//! mutations never touch. Mutating a transcript that shares storage with a
//! snapshot reallocates, so `same_as` against the snapshot turns false.

use std::fmt;
use std::sync::Arc;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }
}

/// Errors from transcript mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptError {
    /// The operation needs a last message but the transcript is empty.
    Empty,
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::Empty => write!(f, "transcript has no messages"),
        }
    }
}

impl std::error::Error for TranscriptError {}

/// Append-only message sequence; only the last entry may be rewritten.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<Vec<Message>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transcript holding a single message.
    pub fn with_message(message: Message) -> Self {
        Self {
            messages: Arc::new(vec![message]),
        }
    }

    pub fn append(&mut self, message: Message) {
        Arc::make_mut(&mut self.messages).push(message);
    }

    /// Replaces the content of the last message, keeping its role.
    ///
    /// # Errors
    /// Returns `TranscriptError::Empty` if there is no message.
    pub fn update_last(&mut self, content: impl Into<String>) -> Result<(), TranscriptError> {
        if self.messages.is_empty() {
            return Err(TranscriptError::Empty);
        }
        let messages = Arc::make_mut(&mut self.messages);
        if let Some(last) = messages.last_mut() {
            last.content = content.into();
        }
        Ok(())
    }

    /// Replaces the last message wholesale.
    ///
    /// # Errors
    /// Returns `TranscriptError::Empty` if there is no message.
    pub fn replace_last(&mut self, message: Message) -> Result<(), TranscriptError> {
        if self.messages.is_empty() {
            return Err(TranscriptError::Empty);
        }
        let messages = Arc::make_mut(&mut self.messages);
        if let Some(last) = messages.last_mut() {
            *last = message;
        }
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// True when both transcripts share the same storage.
    pub fn same_as(&self, other: &Transcript) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
