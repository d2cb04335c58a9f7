//! Application layer errors

use thiserror::Error;

/// Runtime errors raised while processing events or delivering replies.
///
/// None of these stop a background task: they are logged where they occur
/// and the offending event or instruction is dropped.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Context resolution failed: {0}")]
    Context(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Outgoing queue closed")]
    ChannelClosed,

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Startup errors. Any of these must prevent the bot from starting.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Command handler with name {0} already exists")]
    DuplicateCommand(String),

    #[error("Menu with name {0} already exists")]
    DuplicateMenu(String),

    #[error("Command name {0} is reserved")]
    ReservedCommand(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
