//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatId, ReplyMarkup, Update, User};
use crate::domain::traits::Transport;

/// Conversation id used for everything typed on the console
pub const CONSOLE_CHAT_ID: ChatId = 1;

/// Prefix of console lines that simulate a button press
pub const PRESS_PREFIX: &str = "cb:";

/// Console bot adapter for local development
#[derive(Debug, Default)]
pub struct ConsoleAdapter;

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Turn one console line into an update
    pub fn parse_line(line: &str) -> Option<Update> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let user = User::new(CONSOLE_CHAT_ID).with_username("console");
        Some(match line.strip_prefix(PRESS_PREFIX) {
            Some(data) => Update::callback(uuid::Uuid::new_v4().to_string(), CONSOLE_CHAT_ID, user, data),
            None => Update::Message {
                chat_id: CONSOLE_CHAT_ID,
                sender: Some(user),
                text: line.to_string(),
            },
        })
    }

    /// Read stdin until EOF or until the receiving side goes away
    pub async fn read_updates(&self, tx: mpsc::Sender<Update>) -> Result<(), BotError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| BotError::Internal(format!("stdin: {}", e)))?
        {
            let Some(update) = Self::parse_line(&line) else {
                continue;
            };
            if tx.send(update).await.is_err() {
                break;
            }
        }
        tracing::info!("Console input closed");
        Ok(())
    }
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn send(&self, _chat_id: ChatId, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), BotError> {
        println!("[BOT] {}", text);
        match markup {
            Some(ReplyMarkup::Inline(kb)) => {
                for row in &kb.inline_keyboard {
                    let row_text: Vec<String> = row
                        .iter()
                        .map(|b| format!("{} <{}{}>", b.text, PRESS_PREFIX, b.callback_data))
                        .collect();
                    println!("  [Buttons] {}", row_text.join(" | "));
                }
            }
            Some(ReplyMarkup::Reply(kb)) => {
                for row in &kb.keyboard {
                    let row_text: Vec<&str> = row.iter().map(|k| k.text.as_str()).collect();
                    println!("  [Keys] {}", row_text.join(" | "));
                }
            }
            None => {}
        }
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str) -> Result<(), BotError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_a_message() {
        match ConsoleAdapter::parse_line("  /help  ") {
            Some(Update::Message { text, chat_id, .. }) => {
                assert_eq!(text, "/help");
                assert_eq!(chat_id, CONSOLE_CHAT_ID);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_press_line_is_a_callback_query() {
        match ConsoleAdapter::parse_line("cb:cb|t|main") {
            Some(Update::CallbackQuery { data, .. }) => assert_eq!(data, "cb|t|main"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(ConsoleAdapter::parse_line("   ").is_none());
    }
}
