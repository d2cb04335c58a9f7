//! Responder - handler-facing side of the outgoing queue

use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{Callback, ChatId, ReplyMarkup};
use crate::domain::traits::{Instruction, OutgoingMessage};

/// Producer half of the outgoing queue
pub type Outbox = mpsc::Sender<Box<dyn Instruction>>;

/// Consumer half of the outgoing queue
pub type OutboxReceiver = mpsc::Receiver<Box<dyn Instruction>>;

/// Create the outgoing queue. A capacity of zero is raised to one.
pub fn outbox(capacity: usize) -> (Outbox, OutboxReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Sends replies for one conversation through the outgoing queue.
///
/// Sending waits while the queue is full.
#[derive(Clone)]
pub struct Responder {
    chat_id: ChatId,
    locale: Option<String>,
    outgoing: Outbox,
}

impl Responder {
    pub fn new(chat_id: ChatId, outgoing: Outbox) -> Self {
        Self {
            chat_id,
            locale: None,
            outgoing,
        }
    }

    /// Locale of the conversation, used for menus sent through callbacks
    pub fn with_locale(mut self, locale: Option<&str>) -> Self {
        self.locale = locale.map(String::from);
        self
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub async fn send(&self, instruction: impl Instruction + 'static) -> Result<(), BotError> {
        self.outgoing
            .send(Box::new(instruction))
            .await
            .map_err(|_| BotError::ChannelClosed)
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), BotError> {
        self.send(OutgoingMessage::new(self.chat_id, text)).await
    }

    pub async fn send_with_markup(
        &self,
        text: impl Into<String>,
        markup: impl Into<ReplyMarkup>,
    ) -> Result<(), BotError> {
        self.send(OutgoingMessage::new(self.chat_id, text).with_markup(markup))
            .await
    }

    /// Queue a callback as a message, addressed to this conversation unless
    /// it names another one
    pub async fn send_callback(&self, mut callback: Callback) -> Result<(), BotError> {
        callback.set_chat_if_unset(self.chat_id);
        callback.set_locale_if_unset(self.locale.as_deref());
        self.send(callback).await
    }
}
