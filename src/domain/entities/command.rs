use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::ConfigError;
use crate::domain::traits::{FnHandler, Handler};

use super::{InboundMessage, MENU_COMMAND};

/// A command registration: a unique name bound to a handler
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub handler: Arc<dyn Handler>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            handler: Arc::new(handler),
        }
    }

    /// Command answering with the text returned by `reply`
    pub fn with_reply<F>(name: impl Into<String>, reply: F) -> Self
    where
        F: Fn(&InboundMessage) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(name, FnHandler::new(reply))
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Command registry. Names are unique; registering a name twice is a
/// configuration error.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), ConfigError> {
        if command.name == MENU_COMMAND {
            return Err(ConfigError::ReservedCommand(command.name));
        }
        self.insert(command)
    }

    /// Install the reserved menu route
    pub(crate) fn register_menu_route(&mut self, handler: Arc<dyn Handler>) -> Result<(), ConfigError> {
        self.insert(Command {
            name: MENU_COMMAND.to_string(),
            description: None,
            usage: None,
            handler,
        })
    }

    fn insert(&mut self, command: Command) -> Result<(), ConfigError> {
        if command.name.is_empty() {
            return Err(ConfigError::InvalidValue("command name is empty".to_string()));
        }
        if self.commands.contains_key(&command.name) {
            return Err(ConfigError::DuplicateCommand(command.name));
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.commands.get(name).map(|c| Arc::clone(&c.handler))
    }

    /// User-facing commands ordered by name
    pub fn all(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self
            .commands
            .values()
            .filter(|c| c.name != MENU_COMMAND)
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
