//! Channel contracts: inbound events, outbound messages, and the messenger.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// What an inbound event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A text message.
    Text(String),
    /// Anything else (image, sticker, follow...). Holds the platform's type label.
    Other(String),
}

/// One event delivered by the inbound channel.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Opaque user identifier.
    pub user_id: String,
    /// Single-use token for replying to this event, if the platform issued one.
    pub reply_token: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(
        user_id: impl Into<String>,
        reply_token: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            reply_token,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn other(
        user_id: impl Into<String>,
        reply_token: Option<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            reply_token,
            kind: EventKind::Other(kind.into()),
        }
    }
}

/// A quick-reply button: the label shown, and the text sent back when tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub text: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// A button whose label is also the text it sends.
    pub fn echo(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: text.clone(),
            text,
        }
    }
}

/// A text message to deliver, with optional quick-reply buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_quick_replies(mut self, quick_replies: Vec<QuickReply>) -> Self {
        self.quick_replies = quick_replies;
        self
    }
}

/// Outbound channel.
///
/// `reply` is bound to one inbound event and may be used at most once per
/// token; `push` is addressed to a user and may be used any number of times.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Channel name (for logging).
    fn name(&self) -> &str;

    /// Reply to an inbound event.
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), ChannelError>;

    /// Push messages to a user.
    async fn push(&self, user_id: &str, messages: Vec<OutgoingMessage>) -> Result<(), ChannelError>;

    /// Look up a user's display name.
    async fn display_name(&self, _user_id: &str) -> Option<String> {
        None
    }
}

/// Delivers messages for a single inbound event.
///
/// The first send uses the event's reply token; every later send (or a send
/// after the reply failed) pushes to the user instead.
pub struct Responder {
    messenger: Arc<dyn Messenger>,
    user_id: String,
    reply_token: Option<String>,
}

impl Responder {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        user_id: impl Into<String>,
        reply_token: Option<String>,
    ) -> Self {
        Self {
            messenger,
            user_id: user_id.into(),
            reply_token,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Send one message.
    pub async fn send(&mut self, message: OutgoingMessage) -> Result<(), ChannelError> {
        if let Some(token) = self.reply_token.take() {
            match self.messenger.reply(&token, vec![message.clone()]).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    // Reply tokens expire; fall back to push.
                    tracing::warn!(
                        channel = self.messenger.name(),
                        user_id = %self.user_id,
                        error = %e,
                        "Reply failed, pushing instead"
                    );
                }
            }
        }
        self.messenger.push(&self.user_id, vec![message]).await
    }
}
