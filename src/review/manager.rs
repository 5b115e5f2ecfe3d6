//! ReviewManager — dispatches inbound events through the step machine and
//! runs the completion calls for critiques and follow-up questions.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::channels::{EventKind, InboundEvent, Messenger, OutgoingMessage, Responder};
use crate::config::ReviewLimits;
use crate::error::ReviewError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

use super::chunk::delivery_chunks;
use super::machine::{self, Action};
use super::prompts;
use super::replies;
use super::session::SessionStore;
use super::state::{ConversationState, ReviewStep};

/// Max tokens for follow-up answers.
const ANSWER_MAX_TOKENS: u32 = 1024;

/// Coordinates sessions, the step machine, the completion service and delivery.
pub struct ReviewManager {
    llm: Arc<dyn LlmProvider>,
    messenger: Arc<dyn Messenger>,
    sessions: Arc<SessionStore>,
    limits: ReviewLimits,
}

impl ReviewManager {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        messenger: Arc<dyn Messenger>,
        sessions: Arc<SessionStore>,
        limits: ReviewLimits,
    ) -> Self {
        Self {
            llm,
            messenger,
            sessions,
            limits,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one inbound event. Failures are logged; the user always gets a message
    /// unless delivery itself fails.
    pub async fn handle_event(&self, event: InboundEvent) {
        let InboundEvent {
            user_id,
            reply_token,
            kind,
        } = event;

        if user_id.is_empty() {
            warn!("Ignoring event without user id");
            return;
        }

        let mut responder =
            Responder::new(Arc::clone(&self.messenger), user_id.clone(), reply_token);

        let result = match kind {
            EventKind::Text(text) => self.handle_text(&mut responder, &text).await,
            EventKind::Other(kind) => {
                debug!(%user_id, %kind, "Unsupported event kind");
                self.deliver(&mut responder, replies::unsupported_media()).await
            }
        };

        if let Err(e) = result {
            warn!(%user_id, error = %e, "Event handling ended with an error");
        }
    }

    async fn handle_text(&self, responder: &mut Responder, text: &str) -> Result<(), ReviewError> {
        let user_id = responder.user_id().to_string();
        // Held until the event is fully handled, including completion calls.
        let mut slot = self.sessions.lock(&user_id).await;

        let action = machine::advance(&mut slot.state, text, &self.limits);
        debug!(
            %user_id,
            step = %slot
                .state
                .as_ref()
                .map(|s| s.step.to_string())
                .unwrap_or_else(|| "none".into()),
            "Advanced conversation"
        );

        match action {
            Action::Reply(message) => self.deliver(responder, message).await,
            Action::Welcome => {
                let name = self.messenger.display_name(&user_id).await;
                info!(%user_id, "New conversation");
                self.deliver(responder, replies::welcome(name.as_deref())).await
            }
            Action::GenerateReview { ack } => {
                if let Some(ack) = ack {
                    self.deliver(responder, ack).await?;
                }
                self.generate_review(responder, slot.state.as_mut()).await
            }
            Action::AnswerQuestion { question } => match slot.state.as_ref() {
                Some(state) => self.answer_question(responder, state, &question).await,
                None => self.deliver(responder, replies::no_content()).await,
            },
        }
    }

    /// Generate the critique for `state` and deliver it in chunks.
    ///
    /// On success the critique is stored and the step becomes `ReviewDone`.
    /// On failure the user gets one apology and the state is left unchanged.
    pub async fn generate_review(
        &self,
        responder: &mut Responder,
        state: Option<&mut ConversationState>,
    ) -> Result<(), ReviewError> {
        let user_id = responder.user_id().to_string();
        let Some(state) = state.filter(|s| !s.buffer.trim().is_empty()) else {
            self.deliver(responder, replies::no_content()).await?;
            return Err(ReviewError::NoContent { user_id });
        };

        info!(
            %user_id,
            chars = state.manuscript_chars(),
            model = self.llm.model_name(),
            "Generating review"
        );

        let prompt = prompts::review_prompt(state);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)]);
        let response = match self.llm.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(%user_id, error = %e, "Review generation failed");
                self.deliver(responder, replies::review_failed()).await?;
                return Err(e.into());
            }
        };

        let chunks = delivery_chunks(&response.content, self.limits.chunk_chars);
        if chunks.is_empty() {
            warn!(%user_id, "Completion returned an empty review");
            self.deliver(responder, replies::review_empty()).await?;
            return Err(ReviewError::EmptyReview);
        }

        state.last_review = Some(response.content);
        state.move_to(ReviewStep::ReviewDone);

        info!(%user_id, chunks = chunks.len(), "Delivering review");
        for chunk in chunks {
            self.deliver(responder, OutgoingMessage::text(chunk)).await?;
        }
        self.deliver(responder, replies::review_closing()).await
    }

    /// Answer a follow-up question grounded in the manuscript and critique.
    pub async fn answer_question(
        &self,
        responder: &mut Responder,
        state: &ConversationState,
        question: &str,
    ) -> Result<(), ReviewError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::question_system_prompt()),
            ChatMessage::user(prompts::question_prompt(state, question)),
        ])
        .with_max_tokens(ANSWER_MAX_TOKENS);

        let answer = match self.llm.complete(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(user_id = responder.user_id(), error = %e, "Follow-up answer failed");
                return self.deliver(responder, replies::answer_failed()).await;
            }
        };

        let chunks = delivery_chunks(&answer, self.limits.chunk_chars);
        if chunks.is_empty() {
            return self.deliver(responder, replies::answer_failed()).await;
        }
        for chunk in chunks {
            self.deliver(responder, OutgoingMessage::text(chunk)).await?;
        }
        Ok(())
    }

    async fn deliver(
        &self,
        responder: &mut Responder,
        message: OutgoingMessage,
    ) -> Result<(), ReviewError> {
        responder.send(message).await.map_err(|e| {
            error!(user_id = responder.user_id(), error = %e, "Delivery failed");
            ReviewError::from(e)
        })
    }
}
