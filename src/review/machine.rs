//! Step transitions: how one inbound text moves a user's conversation.
//!
//! `advance` is pure. It mutates the session in place and returns what
//! the caller must do next; all I/O (sending, completion calls) happens in
//! the manager.

use crate::channels::OutgoingMessage;
use crate::config::ReviewLimits;

use super::catalog::{
    self, Aspect, CANCEL_KEYWORD, CONFIRM_REVIEW_KEYWORD, Genre, Level, NO_KEYWORD, YES_KEYWORD,
};
use super::replies;
use super::state::{ConversationState, ReviewStep};

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this message.
    Reply(OutgoingMessage),
    /// A session was just created for an unseen user; greet them.
    Welcome,
    /// Send the acknowledgement (if any), then generate and deliver the review.
    GenerateReview { ack: Option<OutgoingMessage> },
    /// Answer a follow-up question about the delivered review.
    AnswerQuestion { question: String },
}

/// Interpret `text` against the session and advance it.
///
/// `session` is `None` for a user with no conversation (never seen, or
/// cancelled); it is created here and cleared here on cancel.
pub fn advance(
    session: &mut Option<ConversationState>,
    text: &str,
    limits: &ReviewLimits,
) -> Action {
    if catalog::is_reset(text) {
        *session = Some(ConversationState::new());
        return Action::Reply(replies::genre_prompt());
    }

    let Some(state) = session.as_mut() else {
        *session = Some(ConversationState::new());
        return Action::Welcome;
    };

    let input = text.trim();
    match state.step {
        ReviewStep::Genre => match Genre::from_label(input) {
            Some(genre) => {
                state.genre = Some(genre);
                state.move_to(ReviewStep::Level);
                Action::Reply(replies::level_prompt())
            }
            None => Action::Reply(replies::genre_invalid()),
        },

        ReviewStep::Level => match Level::from_label(input) {
            Some(level) => {
                state.level = Some(level);
                state.move_to(ReviewStep::Aspect);
                Action::Reply(replies::aspect_prompt())
            }
            None => Action::Reply(replies::level_invalid()),
        },

        ReviewStep::Aspect => match Aspect::from_label(input) {
            Some(aspect) => {
                state.aspect = Some(aspect);
                state.buffer.clear();
                state.move_to(ReviewStep::AwaitingText);
                Action::Reply(replies::request_text(limits.min_chars))
            }
            None => Action::Reply(replies::aspect_invalid()),
        },

        ReviewStep::AwaitingText | ReviewStep::AwaitingAdditionalText => {
            // The raw text is kept; only keyword matching uses the trimmed form.
            state.append_text(text);

            let chars = state.manuscript_chars();
            if state.step == ReviewStep::AwaitingText && chars < limits.min_chars {
                return Action::Reply(replies::too_short(limits.min_chars, chars));
            }

            if state.buffer_chars() > limits.max_chars {
                state.move_to(ReviewStep::ConfirmReviewOverflow);
                return Action::Reply(replies::overflow_confirm(limits.max_chars));
            }

            state.move_to(ReviewStep::AwaitingContinueConfirm);
            Action::Reply(replies::continue_confirm())
        }

        ReviewStep::ConfirmReviewOverflow => {
            if input == CONFIRM_REVIEW_KEYWORD || input == YES_KEYWORD {
                state.move_to(ReviewStep::GeneratingReview);
                Action::GenerateReview { ack: None }
            } else if input == CANCEL_KEYWORD || input == NO_KEYWORD {
                *session = None;
                Action::Reply(replies::cancelled())
            } else {
                Action::Reply(replies::overflow_invalid())
            }
        }

        ReviewStep::AwaitingContinueConfirm => {
            if input == YES_KEYWORD {
                state.move_to(ReviewStep::AwaitingAdditionalText);
                Action::Reply(replies::send_more())
            } else if input == NO_KEYWORD {
                state.move_to(ReviewStep::GeneratingReview);
                Action::GenerateReview {
                    ack: Some(replies::review_ack()),
                }
            } else {
                Action::Reply(replies::continue_invalid())
            }
        }

        ReviewStep::GeneratingReview => Action::Reply(replies::review_unfinished()),

        ReviewStep::ReviewDone => Action::AnswerQuestion {
            question: input.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::catalog::RESET_KEYWORD;

    fn limits() -> ReviewLimits {
        ReviewLimits::default()
    }

    /// A session parked at `AwaitingText` with all selections made.
    fn awaiting_text() -> Option<ConversationState> {
        let mut session = Some(ConversationState::new());
        for input in ["SF", "中辛", "キャラクター"] {
            advance(&mut session, input, &limits());
        }
        assert_eq!(session.as_ref().unwrap().step, ReviewStep::AwaitingText);
        session
    }

    fn step(session: &Option<ConversationState>) -> ReviewStep {
        session.as_ref().unwrap().step
    }

    #[test]
    fn first_contact_creates_session_and_welcomes() {
        let mut session = None;
        let action = advance(&mut session, "こんにちは", &limits());
        assert_eq!(action, Action::Welcome);
        assert_eq!(session, Some(ConversationState::new()));
    }

    #[test]
    fn first_contact_with_reset_prompts_genre() {
        let mut session = None;
        let action = advance(&mut session, RESET_KEYWORD, &limits());
        assert_eq!(action, Action::Reply(replies::genre_prompt()));
        assert_eq!(step(&session), ReviewStep::Genre);
    }

    #[test]
    fn selections_walk_to_awaiting_text() {
        let session = awaiting_text();
        let state = session.unwrap();
        assert_eq!(state.genre, Some(Genre::ScienceFiction));
        assert_eq!(state.level, Some(Level::Balanced));
        assert_eq!(state.aspect, Some(Aspect::Characters));
        assert!(state.buffer.is_empty());
    }

    #[test]
    fn invalid_genre_reprompts_same_step() {
        let mut session = Some(ConversationState::new());
        let action = advance(&mut session, "純文学", &limits());
        assert_eq!(action, Action::Reply(replies::genre_invalid()));
        assert_eq!(step(&session), ReviewStep::Genre);
        assert!(session.unwrap().genre.is_none());
    }

    #[test]
    fn invalid_level_and_aspect_reprompt() {
        let mut session = Some(ConversationState::new());
        advance(&mut session, "ホラー", &limits());
        assert_eq!(
            advance(&mut session, "激辛", &limits()),
            Action::Reply(replies::level_invalid())
        );
        assert_eq!(step(&session), ReviewStep::Level);

        advance(&mut session, "辛口", &limits());
        assert_eq!(
            advance(&mut session, "世界観", &limits()),
            Action::Reply(replies::aspect_invalid())
        );
        assert_eq!(step(&session), ReviewStep::Aspect);
    }

    #[test]
    fn append_preserves_previous_buffer_plus_newline() {
        let mut session = awaiting_text();
        let first = "あ".repeat(1200);
        advance(&mut session, &first, &limits());
        advance(&mut session, YES_KEYWORD, &limits());
        let before = session.as_ref().unwrap().buffer.clone();

        advance(&mut session, "続きの文章", &limits());
        assert_eq!(session.unwrap().buffer, format!("{before}\n続きの文章"));
    }

    #[test]
    fn text_of_999_chars_is_rejected() {
        let mut session = awaiting_text();
        let action = advance(&mut session, &"あ".repeat(999), &limits());
        assert_eq!(action, Action::Reply(replies::too_short(1000, 999)));
        assert_eq!(step(&session), ReviewStep::AwaitingText);
        // Not rolled back.
        assert_eq!(session.unwrap().buffer, format!("\n{}", "あ".repeat(999)));
    }

    #[test]
    fn text_of_1000_chars_is_accepted() {
        let mut session = awaiting_text();
        let action = advance(&mut session, &"あ".repeat(1000), &limits());
        assert_eq!(action, Action::Reply(replies::continue_confirm()));
        assert_eq!(step(&session), ReviewStep::AwaitingContinueConfirm);
    }

    #[test]
    fn short_pieces_accumulate_until_minimum() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(600), &limits());
        assert_eq!(step(&session), ReviewStep::AwaitingText);
        advance(&mut session, &"い".repeat(600), &limits());
        assert_eq!(step(&session), ReviewStep::AwaitingContinueConfirm);
    }

    #[test]
    fn buffer_of_30001_chars_triggers_overflow() {
        let mut session = awaiting_text();
        // Leading newline + 30000 characters.
        let action = advance(&mut session, &"あ".repeat(30_000), &limits());
        assert_eq!(session.as_ref().unwrap().buffer_chars(), 30_001);
        assert_eq!(action, Action::Reply(replies::overflow_confirm(30_000)));
        assert_eq!(step(&session), ReviewStep::ConfirmReviewOverflow);
    }

    #[test]
    fn buffer_of_30000_chars_does_not_overflow() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(29_999), &limits());
        assert_eq!(session.as_ref().unwrap().buffer_chars(), 30_000);
        assert_eq!(step(&session), ReviewStep::AwaitingContinueConfirm);
    }

    #[test]
    fn additional_text_skips_minimum_but_checks_overflow() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(1000), &limits());
        advance(&mut session, YES_KEYWORD, &limits());
        assert_eq!(step(&session), ReviewStep::AwaitingAdditionalText);

        advance(&mut session, "短い", &limits());
        assert_eq!(step(&session), ReviewStep::AwaitingContinueConfirm);

        advance(&mut session, YES_KEYWORD, &limits());
        advance(&mut session, &"い".repeat(29_000), &limits());
        assert_eq!(step(&session), ReviewStep::ConfirmReviewOverflow);
    }

    #[test]
    fn declining_continuation_generates_with_ack() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(1200), &limits());
        let action = advance(&mut session, NO_KEYWORD, &limits());
        assert_eq!(
            action,
            Action::GenerateReview {
                ack: Some(replies::review_ack())
            }
        );
        assert_eq!(step(&session), ReviewStep::GeneratingReview);
    }

    #[test]
    fn unclear_continuation_answer_reprompts() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(1200), &limits());
        let action = advance(&mut session, "たぶん", &limits());
        assert_eq!(action, Action::Reply(replies::continue_invalid()));
        assert_eq!(step(&session), ReviewStep::AwaitingContinueConfirm);
    }

    #[test]
    fn overflow_confirm_generates_without_ack() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(30_001), &limits());
        let action = advance(&mut session, CONFIRM_REVIEW_KEYWORD, &limits());
        assert_eq!(action, Action::GenerateReview { ack: None });
        assert_eq!(step(&session), ReviewStep::GeneratingReview);
    }

    #[test]
    fn overflow_cancel_clears_session() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(30_001), &limits());
        let action = advance(&mut session, CANCEL_KEYWORD, &limits());
        assert_eq!(action, Action::Reply(replies::cancelled()));
        assert!(session.is_none());
    }

    #[test]
    fn overflow_other_input_reprompts() {
        let mut session = awaiting_text();
        advance(&mut session, &"あ".repeat(30_001), &limits());
        let before = session.clone();
        let action = advance(&mut session, "えっと", &limits());
        assert_eq!(action, Action::Reply(replies::overflow_invalid()));
        assert_eq!(session, before);
    }

    #[test]
    fn review_done_routes_to_question() {
        let mut state = ConversationState::new();
        state.step = ReviewStep::ReviewDone;
        let mut session = Some(state);
        let action = advance(&mut session, " 主人公の動機は弱い？ ", &limits());
        assert_eq!(
            action,
            Action::AnswerQuestion {
                question: "主人公の動機は弱い？".into()
            }
        );
        assert_eq!(step(&session), ReviewStep::ReviewDone);
    }

    #[test]
    fn generating_step_points_to_reset() {
        let mut state = ConversationState::new();
        state.step = ReviewStep::GeneratingReview;
        let mut session = Some(state);
        assert_eq!(
            advance(&mut session, "まだ？", &limits()),
            Action::Reply(replies::review_unfinished())
        );
    }

    #[test]
    fn reset_from_every_step_yields_clean_genre_state() {
        let steps = [
            ReviewStep::Genre,
            ReviewStep::Level,
            ReviewStep::Aspect,
            ReviewStep::AwaitingText,
            ReviewStep::AwaitingContinueConfirm,
            ReviewStep::AwaitingAdditionalText,
            ReviewStep::ConfirmReviewOverflow,
            ReviewStep::GeneratingReview,
            ReviewStep::ReviewDone,
        ];
        for from in steps {
            let mut session = Some(ConversationState {
                step: from,
                genre: Some(Genre::Mystery),
                level: Some(Level::Harsh),
                aspect: Some(Aspect::Prose),
                buffer: "\n本文".into(),
                last_review: Some("講評".into()),
            });
            let action = advance(&mut session, RESET_KEYWORD, &limits());
            assert_eq!(action, Action::Reply(replies::genre_prompt()), "from {from}");
            assert_eq!(session, Some(ConversationState::new()), "from {from}");
        }
    }
}
