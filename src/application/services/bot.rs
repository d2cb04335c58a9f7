//! Bot - registration surface and the running pipeline

use std::sync::Arc;

use tokio::sync::mpsc;

use super::delivery::{run_incoming, run_outgoing};
use super::lifecycle::Lifecycle;
use crate::application::errors::{BotError, ConfigError};
use crate::application::messaging::{outbox, Dispatcher, MenuHandler, MessageParser, Outbox, DEFAULT_MAX_DEPTH};
use crate::domain::entities::{Command, CommandRegistry, Menu, Update};
use crate::domain::traits::{ContextProvider, EmptyContext, Instruction, Transport};
use crate::infrastructure::config::Config;

/// Default capacity of the outgoing queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// A bot being wired up. Registrations are only possible before
/// [`Bot::start`].
pub struct Bot {
    transport: Arc<dyn Transport>,
    registry: CommandRegistry,
    menus: MenuHandler,
    context: Option<Arc<dyn ContextProvider>>,
    parser: MessageParser,
    queue_capacity: usize,
    max_depth: usize,
}

impl Bot {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            registry: CommandRegistry::new(),
            menus: MenuHandler::new(),
            context: None,
            parser: MessageParser::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        let mut bot = Self::new(transport);
        bot.parser = MessageParser::new(&config.bot.prefix, &config.bot.separator);
        bot.queue_capacity = config.dispatch.queue_capacity;
        bot.max_depth = config.dispatch.max_redispatch_depth;
        bot
    }

    /// Register a command. A name may only be registered once.
    pub fn register(&mut self, command: Command) -> Result<(), ConfigError> {
        tracing::debug!("Registering command: {}", command.name);
        self.registry.register(command)
    }

    /// Register a menu tree; the menu route is installed on start
    pub fn register_menu(&mut self, menu: impl Menu + 'static) -> Result<(), ConfigError> {
        self.menus.register(Arc::new(menu))
    }

    pub fn set_context_provider(&mut self, provider: impl ContextProvider + 'static) {
        self.context = Some(Arc::new(provider));
    }

    /// Registered commands ordered by name
    pub fn commands(&self) -> Vec<&Command> {
        self.registry.all()
    }

    /// Spawn the inbound listener and the outgoing consumer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(mut self, updates: mpsc::Receiver<Update>) -> Result<RunningBot, ConfigError> {
        if !self.menus.is_empty() {
            tracing::info!("Installing menu route with {} menus", self.menus.len());
            self.registry.register_menu_route(Arc::new(self.menus))?;
        }

        let context = self
            .context
            .unwrap_or_else(|| Arc::new(EmptyContext) as Arc<dyn ContextProvider>);
        let (tx, rx) = outbox(self.queue_capacity);
        let dispatcher = Dispatcher::new(
            self.parser,
            self.registry,
            context,
            Arc::clone(&self.transport),
            tx.clone(),
        )
        .with_max_depth(self.max_depth);

        let mut lifecycle = Lifecycle::new();
        let incoming = lifecycle.signal();
        let outgoing = lifecycle.signal();
        lifecycle.spawn(run_incoming(dispatcher, updates, incoming));
        lifecycle.spawn(run_outgoing(self.transport, rx, outgoing));
        tracing::info!("Bot started");

        Ok(RunningBot { lifecycle, outgoing: tx })
    }
}

/// Handle to a started bot
pub struct RunningBot {
    lifecycle: Lifecycle,
    outgoing: Outbox,
}

impl RunningBot {
    /// Queue an unsolicited message through the delivery pipeline
    pub async fn send(&self, instruction: impl Instruction + 'static) -> Result<(), BotError> {
        self.outgoing
            .send(Box::new(instruction))
            .await
            .map_err(|_| BotError::ChannelClosed)
    }

    /// Number of background tasks that already finished
    pub fn completed(&self) -> usize {
        self.lifecycle.completed()
    }

    /// Signal shutdown and wait for both background tasks
    pub async fn stop(self) -> Result<(), BotError> {
        tracing::info!("Stopping bot");
        drop(self.outgoing);
        let expected = self.lifecycle.tracked();
        let done = self.lifecycle.shutdown().await?;
        if done != expected {
            tracing::warn!("Only {} of {} background tasks reported completion", done, expected);
        }
        tracing::info!("Bot stopped ({} tasks finished)", done);
        Ok(())
    }
}
