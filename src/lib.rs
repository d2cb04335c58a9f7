//! Command dispatch, inline menus and per-chat conversations for chat bots

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::errors::{BotError, ConfigError};
pub use application::messaging::{Dispatcher, MenuHandler, MessageParser, Responder};
pub use application::services::{Bot, RunningBot};
pub use domain::entities::{
    Callback, CallbackType, ChatId, Command, InboundMessage, InlineKeyboard, Keyboard, Menu,
    MenuPage, LocalizedMenu, Update, User,
};
pub use domain::traits::{ContextProvider, Handler, HandlerResult, Instruction, OutgoingMessage, Transport};
pub use infrastructure::config::Config;
