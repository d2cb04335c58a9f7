use std::fmt;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatId, ReplyMarkup};

/// Transport trait - the chat platform as seen by the delivery pipeline
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text, optionally with a keyboard, to a chat
    async fn send(&self, chat_id: ChatId, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), BotError>;

    /// Acknowledge a button press so the client stops its spinner
    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError>;
}

/// A unit of outbound work executed by the delivery pipeline
#[async_trait]
pub trait Instruction: Send + Sync + fmt::Debug {
    async fn execute(&self, transport: &dyn Transport) -> Result<(), BotError>;
}

/// The plain "send this text" instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.markup = Some(markup.into());
        self
    }
}

#[async_trait]
impl Instruction for OutgoingMessage {
    async fn execute(&self, transport: &dyn Transport) -> Result<(), BotError> {
        transport.send(self.chat_id, &self.text, self.markup.as_ref()).await
    }
}
