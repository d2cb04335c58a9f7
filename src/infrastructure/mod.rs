//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Transports (Telegram, console, in-memory)

pub mod config;
pub mod adapters;
