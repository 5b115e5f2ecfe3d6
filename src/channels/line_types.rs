//! LINE Messaging API wire types.

use serde::{Deserialize, Serialize};

use super::channel::{EventKind, InboundEvent, OutgoingMessage};

/// LINE caps quick-reply button labels at 20 characters.
pub const QUICK_REPLY_LABEL_MAX: usize = 20;

/// LINE caps quick replies at 13 items per message.
pub const QUICK_REPLY_MAX_ITEMS: usize = 13;

// ── Outbound ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReplyRequest<'a> {
    #[serde(rename = "replyToken")]
    pub reply_token: &'a str,
    pub messages: Vec<LineMessage>,
}

#[derive(Debug, Serialize)]
pub struct PushRequest<'a> {
    pub to: &'a str,
    pub messages: Vec<LineMessage>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    #[serde(rename = "quickReply", skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<LineQuickReply>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LineQuickReply {
    pub items: Vec<LineQuickReplyItem>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LineQuickReplyItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: LineMessageAction,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LineMessageAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    pub text: String,
}

impl From<OutgoingMessage> for LineMessage {
    fn from(message: OutgoingMessage) -> Self {
        let quick_reply = if message.quick_replies.is_empty() {
            None
        } else {
            Some(LineQuickReply {
                items: message
                    .quick_replies
                    .into_iter()
                    .take(QUICK_REPLY_MAX_ITEMS)
                    .map(|q| LineQuickReplyItem {
                        kind: "action",
                        action: LineMessageAction {
                            kind: "message",
                            label: q.label.chars().take(QUICK_REPLY_LABEL_MAX).collect(),
                            text: q.text,
                        },
                    })
                    .collect(),
            })
        };
        Self {
            kind: "text",
            text: message.text,
            quick_reply,
        }
    }
}

/// Response of `GET /v2/bot/profile/{userId}`.
#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

// ── Inbound ─────────────────────────────────────────────────────────

/// Webhook request body. Events stay untyped so one malformed entry
/// does not reject the whole batch.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

/// Convert a raw webhook event into an `InboundEvent`.
///
/// Returns `None` for events the core cannot act on: unparsable entries,
/// events without a user id, and events without a reply token (unfollow,
/// redelivered events whose token is gone).
pub fn parse_event(raw: serde_json::Value) -> Option<InboundEvent> {
    let event: WebhookEvent = match serde_json::from_value(raw) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed LINE event");
            return None;
        }
    };

    let Some(user_id) = event
        .source
        .and_then(|s| s.user_id)
        .filter(|id| !id.is_empty())
    else {
        tracing::warn!(event_type = %event.kind, "Skipping LINE event without user id");
        return None;
    };

    let Some(reply_token) = event.reply_token.filter(|t| !t.is_empty()) else {
        tracing::debug!(
            event_type = %event.kind,
            %user_id,
            "Skipping LINE event without reply token"
        );
        return None;
    };

    let kind = match (event.kind.as_str(), event.message) {
        ("message", Some(EventMessage { kind, text })) if kind == "text" => match text {
            Some(text) => EventKind::Text(text),
            None => {
                tracing::warn!(%user_id, "Skipping text event without text");
                return None;
            }
        },
        ("message", Some(message)) => EventKind::Other(message.kind),
        (other, _) => EventKind::Other(other.to_string()),
    };

    Some(InboundEvent {
        user_id,
        reply_token: Some(reply_token),
        kind,
    })
}
