//! Domain traits - Abstractions for collaborators

pub mod handler;
pub mod transport;

pub use handler::{ContextProvider, EmptyContext, FnHandler, Handler, HandlerResult};
pub use transport::{Instruction, OutgoingMessage, Transport};
