//! Callbacks - structured payloads returned by handlers and carried by buttons

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{ChatId, InlineKeyboardMarkup, Menu, ReplyMarkup};
use crate::application::errors::BotError;
use crate::domain::traits::{Instruction, Transport};

/// Prefix marking a button value as an encoded callback
pub const CALLBACK_PREFIX: &str = "cb|";

/// Largest encoded callback a button may carry (Telegram's `callback_data`
/// limit, in bytes)
pub const MAX_CALLBACK_DATA: usize = 64;

const FIELD_SEPARATOR: char = '|';
const ESCAPE: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackType {
    Bad,
    CallCommand,
    OpenMenu,
    TransitToMenu,
}

impl CallbackType {
    fn tag(self) -> &'static str {
        match self {
            CallbackType::Bad => "b",
            CallbackType::CallCommand => "c",
            CallbackType::OpenMenu => "o",
            CallbackType::TransitToMenu => "t",
        }
    }

    fn from_tag(tag: &str) -> Self {
        match tag {
            "c" => CallbackType::CallCommand,
            "o" => CallbackType::OpenMenu,
            "t" => CallbackType::TransitToMenu,
            _ => CallbackType::Bad,
        }
    }
}

/// Result of a handler asking the bot to do something beyond a plain reply.
///
/// `command` is a command name without the marker for `CallCommand`, and a
/// menu name for `OpenMenu` / `TransitToMenu`.
#[derive(Clone)]
pub struct Callback {
    pub kind: CallbackType,
    pub command: String,
    pub args: Vec<String>,
    pub menu: Option<Arc<dyn Menu>>,
    pub text: Option<String>,
    pub reply_markup: Option<InlineKeyboardMarkup>,
    pub chat_id: Option<ChatId>,
    /// Locale an embedded menu is rendered in when sent as a message
    pub locale: Option<String>,
}

impl Callback {
    fn new(kind: CallbackType, command: impl Into<String>) -> Self {
        Self {
            kind,
            command: command.into(),
            args: Vec::new(),
            menu: None,
            text: None,
            reply_markup: None,
            chat_id: None,
            locale: None,
        }
    }

    pub fn bad() -> Self {
        Self::new(CallbackType::Bad, "")
    }

    pub fn call_command(command: impl Into<String>, args: Vec<String>) -> Self {
        let mut cb = Self::new(CallbackType::CallCommand, command);
        cb.args = args;
        cb
    }

    /// Open a registered menu by name
    pub fn open_menu(name: impl Into<String>) -> Self {
        Self::new(CallbackType::OpenMenu, name)
    }

    /// Open a menu that the handler holds directly
    pub fn open_menu_page(menu: Arc<dyn Menu>) -> Self {
        let mut cb = Self::new(CallbackType::OpenMenu, menu.name());
        cb.menu = Some(menu);
        cb
    }

    pub fn transit_to(name: impl Into<String>) -> Self {
        Self::new(CallbackType::TransitToMenu, name)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_markup(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    pub fn with_chat(mut self, chat_id: ChatId) -> Self {
        self.chat_id = Some(chat_id);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn set_chat_if_unset(&mut self, chat_id: ChatId) {
        if self.chat_id.is_none() {
            self.chat_id = Some(chat_id);
        }
    }

    pub fn set_locale_if_unset(&mut self, locale: Option<&str>) {
        if self.locale.is_none() {
            self.locale = locale.map(String::from);
        }
    }

    /// Encode as a button value.
    ///
    /// Only type, command and args travel; an embedded menu is carried by
    /// its name in `command`.
    pub fn encode(&self) -> String {
        let mut out = String::from(CALLBACK_PREFIX);
        out.push_str(self.kind.tag());
        for field in std::iter::once(&self.command).chain(self.args.iter()) {
            out.push(FIELD_SEPARATOR);
            escape_into(&mut out, field);
        }
        out
    }

    /// Decode a button value produced by [`Callback::encode`].
    ///
    /// Values without the callback prefix are rejected; an unknown type tag
    /// decodes to a `Bad` callback.
    pub fn decode(data: &str) -> Result<Self, BotError> {
        let body = data
            .strip_prefix(CALLBACK_PREFIX)
            .ok_or_else(|| BotError::Parse(format!("not a callback payload: {}", data)))?;

        let mut fields = split_escaped(body)?.into_iter();
        let tag = fields.next().unwrap_or_default();
        let command = fields.next().unwrap_or_default();

        let mut cb = Self::new(CallbackType::from_tag(&tag), command);
        cb.args = fields.collect();
        Ok(cb)
    }

    /// Markup to attach when this callback is sent as a message
    pub fn markup(&self) -> Option<ReplyMarkup> {
        if let Some(menu) = &self.menu {
            Some(menu.page_for(self.locale.as_deref()).into())
        } else {
            self.reply_markup.clone().map(ReplyMarkup::from)
        }
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.command == other.command
            && self.args == other.args
            && self.text == other.text
            && self.reply_markup == other.reply_markup
            && self.chat_id == other.chat_id
            && self.locale == other.locale
            && self.menu.as_ref().map(|m| m.name().to_string())
                == other.menu.as_ref().map(|m| m.name().to_string())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("kind", &self.kind)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("menu", &self.menu.as_ref().map(|m| m.name().to_string()))
            .field("text", &self.text)
            .field("chat_id", &self.chat_id)
            .field("locale", &self.locale)
            .finish()
    }
}

/// A callback sent as a message: only goes out when it carries text
#[async_trait]
impl Instruction for Callback {
    async fn execute(&self, transport: &dyn Transport) -> Result<(), BotError> {
        let Some(chat_id) = self.chat_id else {
            return Err(BotError::Send("callback has no target chat".to_string()));
        };
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => {
                transport.send(chat_id, text, self.markup().as_ref()).await
            }
            _ => Ok(()),
        }
    }
}

fn escape_into(out: &mut String, field: &str) {
    for c in field.chars() {
        if c == FIELD_SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

fn split_escaped(body: &str) -> Result<Vec<String>, BotError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(BotError::Parse("dangling escape in callback".to_string())),
            },
            FIELD_SEPARATOR => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    Ok(fields)
}
