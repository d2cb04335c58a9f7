//! Message handling - parsing, dispatch, callbacks and the menu route

pub mod callback;
pub mod dispatcher;
pub mod menu_handler;
pub mod parser;
pub mod responder;

pub use callback::{CallbackOutcome, CallbackProcessor};
pub use dispatcher::{Dispatcher, DEFAULT_MAX_DEPTH};
pub use menu_handler::MenuHandler;
pub use parser::MessageParser;
pub use responder::{outbox, Outbox, OutboxReceiver, Responder};
