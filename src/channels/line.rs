//! LINE channel — outbound side of the LINE Messaging API.
//!
//! Replies and pushes are plain JSON POSTs with a bearer token. The inbound
//! webhook lives in `line_webhook`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::channel::{Messenger, OutgoingMessage};
use super::line_types::{LineMessage, Profile, PushRequest, ReplyRequest};
use crate::error::ChannelError;

const LINE_API_BASE: &str = "https://api.line.me";

/// LINE allows at most five messages per reply/push call.
const LINE_MAX_MESSAGES_PER_CALL: usize = 5;

/// Outbound LINE messenger.
pub struct LineMessenger {
    access_token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl LineMessenger {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            access_token,
            api_base: LINE_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the messenger at a different API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/bot/{path}", self.api_base)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url(path))
            .bearer_auth(self.access_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "line".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ChannelError::AuthFailed {
                name: "line".into(),
                reason: body,
            });
        }
        Err(ChannelError::SendFailed {
            name: "line".into(),
            reason: format!("{path} returned {status}: {body}"),
        })
    }
}

fn to_line_messages(messages: Vec<OutgoingMessage>) -> Result<Vec<LineMessage>, ChannelError> {
    if messages.is_empty() {
        return Err(ChannelError::InvalidMessage("no messages to send".into()));
    }
    if messages.len() > LINE_MAX_MESSAGES_PER_CALL {
        return Err(ChannelError::InvalidMessage(format!(
            "{} messages exceed the per-call limit of {LINE_MAX_MESSAGES_PER_CALL}",
            messages.len()
        )));
    }
    if messages.iter().any(|m| m.text.trim().is_empty()) {
        return Err(ChannelError::InvalidMessage("empty message text".into()));
    }
    Ok(messages.into_iter().map(LineMessage::from).collect())
}

#[async_trait]
impl Messenger for LineMessenger {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), ChannelError> {
        let body = ReplyRequest {
            reply_token,
            messages: to_line_messages(messages)?,
        };
        self.post_json("message/reply", &body).await
    }

    async fn push(
        &self,
        user_id: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), ChannelError> {
        let body = PushRequest {
            to: user_id,
            messages: to_line_messages(messages)?,
        };
        self.post_json("message/push", &body).await
    }

    async fn display_name(&self, user_id: &str) -> Option<String> {
        let resp = self
            .client
            .get(self.api_url(&format!("profile/{user_id}")))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => match r.json::<Profile>().await {
                Ok(profile) => Some(profile.display_name),
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "LINE profile parse failed");
                    None
                }
            },
            Ok(r) => {
                tracing::debug!(%user_id, status = %r.status(), "LINE profile lookup refused");
                None
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "LINE profile lookup failed");
                None
            }
        }
    }
}
