//! Domain entities - Core business objects

pub mod callback;
pub mod command;
pub mod keyboard;
pub mod menu;
pub mod message;
pub mod user;

pub use callback::{Callback, CallbackType, CALLBACK_PREFIX, MAX_CALLBACK_DATA};
pub use command::{Command, CommandRegistry};
pub use keyboard::{
    InlineKeyboard, InlineKeyboardButton, InlineKeyboardMarkup, Keyboard, KeyboardButton,
    ReplyKeyboardMarkup, ReplyMarkup, DEFAULT_COLUMNS, DEFAULT_REPLY_COLUMNS, DEFAULT_ROWS,
};
pub use menu::{LocalizedMenu, Menu, MenuPage};
pub use message::{ChatId, InboundMessage, RequestContext, Update};
pub use user::User;

/// Reserved command name of the menu route
pub const MENU_COMMAND: &str = "__menu";
/// First menu-route argument asking to open a menu rather than transit
pub const OPEN_MENU: &str = "open";
