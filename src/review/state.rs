//! Conversation state: which step each user is in and what they have sent.

use serde::{Deserialize, Serialize};

use super::catalog::{Aspect, Genre, Level};

/// The steps of a review conversation.
///
/// Progresses: Genre → Level → Aspect → AwaitingText ⇄ AwaitingContinueConfirm
/// ⇄ AwaitingAdditionalText → (ConfirmReviewOverflow) → GeneratingReview →
/// ReviewDone. The reset command returns to Genre from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStep {
    #[default]
    Genre,
    Level,
    Aspect,
    AwaitingText,
    AwaitingContinueConfirm,
    AwaitingAdditionalText,
    ConfirmReviewOverflow,
    GeneratingReview,
    ReviewDone,
}

impl ReviewStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ReviewStep) -> bool {
        use ReviewStep::*;
        matches!(
            (self, target),
            (Genre, Level)
                | (Level, Aspect)
                | (Aspect, AwaitingText)
                | (AwaitingText, AwaitingContinueConfirm)
                | (AwaitingText, ConfirmReviewOverflow)
                | (AwaitingAdditionalText, AwaitingContinueConfirm)
                | (AwaitingAdditionalText, ConfirmReviewOverflow)
                | (AwaitingContinueConfirm, AwaitingAdditionalText)
                | (AwaitingContinueConfirm, GeneratingReview)
                | (ConfirmReviewOverflow, GeneratingReview)
                | (GeneratingReview, ReviewDone)
        )
    }
}

impl std::fmt::Display for ReviewStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Genre => "genre",
            Self::Level => "level",
            Self::Aspect => "aspect",
            Self::AwaitingText => "awaiting_text",
            Self::AwaitingContinueConfirm => "awaiting_continue_confirm",
            Self::AwaitingAdditionalText => "awaiting_additional_text",
            Self::ConfirmReviewOverflow => "confirm_review_overflow",
            Self::GeneratingReview => "generating_review",
            Self::ReviewDone => "review_done",
        };
        write!(f, "{s}")
    }
}

/// Per-user conversation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: ReviewStep,
    pub genre: Option<Genre>,
    pub level: Option<Level>,
    pub aspect: Option<Aspect>,
    /// Accumulated manuscript, one newline-prefixed chunk per message.
    pub buffer: String,
    /// Critique text from the last successful generation.
    pub last_review: Option<String>,
}

impl ConversationState {
    /// A fresh conversation at the genre step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `next`. Panics in debug builds on a transition outside the table.
    pub fn move_to(&mut self, next: ReviewStep) {
        debug_assert!(
            self.step.can_transition_to(next),
            "invalid step transition {} -> {}",
            self.step,
            next
        );
        tracing::debug!(from = %self.step, to = %next, "Step transition");
        self.step = next;
    }

    /// Append one message to the manuscript.
    pub fn append_text(&mut self, text: &str) {
        self.buffer.push('\n');
        self.buffer.push_str(text);
    }

    /// Raw buffer length in characters, separators included.
    pub fn buffer_chars(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Manuscript length in characters, ignoring surrounding whitespace.
    pub fn manuscript_chars(&self) -> usize {
        self.buffer.trim().chars().count()
    }
}
