//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Errors: Runtime and startup errors
//! - Messaging: Message parsing, dispatching, callbacks, menus
//! - Services: Delivery pipeline, lifecycle, bot wiring

pub mod errors;
pub mod services;
pub mod messaging;
