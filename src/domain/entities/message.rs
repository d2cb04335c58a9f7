use std::collections::HashMap;

use super::User;
use chrono::{DateTime, Utc};

/// Identifies one conversation on the chat platform
pub type ChatId = i64;

/// An inbound event as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// A plain text message typed by the user
    Message {
        chat_id: ChatId,
        sender: Option<User>,
        text: String,
    },
    /// A press on an inline keyboard button
    CallbackQuery {
        id: String,
        chat_id: ChatId,
        sender: User,
        data: String,
    },
}

impl Update {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Update::Message {
            chat_id,
            sender: None,
            text: text.into(),
        }
    }

    pub fn callback(id: impl Into<String>, chat_id: ChatId, sender: User, data: impl Into<String>) -> Self {
        Update::CallbackQuery {
            id: id.into(),
            chat_id,
            sender,
            data: data.into(),
        }
    }
}

/// Per-request values supplied by the context provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    data: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Locale used to pick a variant of a localized menu
    pub fn locale(&self) -> Option<&str> {
        self.get("locale").map(String::as_str)
    }
}

/// A message on its way through the dispatcher.
///
/// `command` and `args` are only filled in when `text` starts with the
/// command marker. The context is attached after the context provider ran.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub chat_id: ChatId,
    pub sender: Option<User>,
    pub text: String,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub context: RequestContext,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id,
            sender: None,
            text: text.into(),
            command: None,
            args: Vec::new(),
            context: RequestContext::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn with_sender_opt(mut self, user: Option<User>) -> Self {
        self.sender = user;
        self
    }

    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}

impl From<Update> for InboundMessage {
    fn from(update: Update) -> Self {
        match update {
            Update::Message { chat_id, sender, text } => {
                InboundMessage::new(chat_id, text).with_sender_opt(sender)
            }
            Update::CallbackQuery { chat_id, sender, data, .. } => {
                InboundMessage::new(chat_id, data).with_sender(sender)
            }
        }
    }
}
