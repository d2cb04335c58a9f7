//! Application services - Bot wiring and the background tasks

pub mod bot;
pub mod delivery;
pub mod lifecycle;

pub use bot::{Bot, RunningBot, DEFAULT_QUEUE_CAPACITY};
pub use delivery::{run_incoming, run_outgoing};
pub use lifecycle::{Lifecycle, ShutdownSignal};
