//! Inbox channel types.
//!
//! Effect handlers send `UiEvent`s to the inbox; the runtime drains it once
//! per loop iteration.

use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;
