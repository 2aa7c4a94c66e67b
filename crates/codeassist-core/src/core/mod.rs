//! Conversation domain: transcript store, segment parser, request driver.

pub mod conversation;
pub mod driver;
pub mod events;
pub mod segments;
pub mod transcript;
