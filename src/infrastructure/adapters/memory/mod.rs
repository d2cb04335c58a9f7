//! In-memory adapter that records everything sent through it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatId, ReplyMarkup};
use crate::domain::traits::Transport;

/// One message accepted by the memory transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<SentMessage>>,
    answered: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail until switched off again
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, chat_id: ChatId, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), BotError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BotError::Send(format!("refusing to send to {}", chat_id)));
        }
        self.sent
            .lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?
            .push(SentMessage {
                chat_id,
                text: text.to_string(),
                markup: markup.cloned(),
            });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        self.answered
            .lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?
            .push(callback_id.to_string());
        Ok(())
    }
}
