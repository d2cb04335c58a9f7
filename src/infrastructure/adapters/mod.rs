//! Transport adapters

pub mod console;
pub mod memory;
pub mod telegram;

pub use console::ConsoleAdapter;
pub use memory::{MemoryTransport, SentMessage};
pub use telegram::TelegramAdapter;
