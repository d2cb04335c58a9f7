//! Domain layer - Core types and collaborator abstractions
//!
//! This layer contains:
//! - Entities: messages, commands, callbacks, keyboards, menus
//! - Traits: Abstractions for the transport, handlers and context providers

pub mod entities;
pub mod traits;
