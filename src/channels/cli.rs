//! CLI channel — stdin/stdout REPL for local testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{InboundEvent, Messenger, OutgoingMessage};
use crate::error::ChannelError;
use crate::review::ReviewManager;

/// Fixed user id for the terminal session.
pub const CLI_USER: &str = "local-user";

/// Typing this sends a non-text event, like a sticker would.
const STICKER_COMMAND: &str = "/sticker";

/// A simple CLI channel that reads from stdin and writes to stdout.
#[derive(Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }

    /// Feed stdin lines to `manager` until EOF or `/quit`.
    pub async fn run(&self, manager: Arc<ReviewManager>) -> Result<(), ChannelError> {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        let mut turn: u64 = 0;
        eprint!("> ");

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    return Err(ChannelError::InvalidMessage(e.to_string()));
                }
            };

            let line = line.trim();
            if line.is_empty() {
                eprint!("> ");
                continue;
            }
            if line == "/quit" {
                break;
            }

            // Fresh token per line so the first message of each turn is a reply.
            turn += 1;
            let token = Some(format!("cli-{turn}"));
            let event = if line == STICKER_COMMAND {
                InboundEvent::other(CLI_USER, token, "sticker")
            } else {
                InboundEvent::text(CLI_USER, token, line)
            };
            manager.handle_event(event).await;
            eprint!("> ");
        }

        Ok(())
    }
}

/// Render a message and its buttons for the terminal.
pub fn render(message: &OutgoingMessage) -> String {
    if message.quick_replies.is_empty() {
        return message.text.clone();
    }
    let buttons: Vec<String> = message
        .quick_replies
        .iter()
        .map(|q| format!("[{}]", q.label))
        .collect();
    format!("{}\n{}", message.text, buttons.join(" "))
}

#[async_trait]
impl Messenger for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn reply(
        &self,
        _reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), ChannelError> {
        for message in &messages {
            println!("\n{}\n", render(message));
        }
        Ok(())
    }

    async fn push(
        &self,
        _user_id: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), ChannelError> {
        for message in &messages {
            println!("\n{}\n", render(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::QuickReply;

    #[test]
    fn render_plain_text() {
        assert_eq!(render(&OutgoingMessage::text("こんにちは")), "こんにちは");
    }

    #[test]
    fn render_lists_button_labels() {
        let message = OutgoingMessage::text("続きはありますか？").with_quick_replies(vec![
            QuickReply::echo("はい"),
            QuickReply::echo("いいえ"),
        ]);
        assert_eq!(render(&message), "続きはありますか？\n[はい] [いいえ]");
    }
}
