//! Menu route - the handler behind the reserved menu command

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::responder::Responder;
use crate::application::errors::ConfigError;
use crate::domain::entities::{InboundMessage, Menu, MENU_COMMAND, OPEN_MENU};
use crate::domain::traits::{Handler, HandlerResult, OutgoingMessage};

/// Renders registered menus by name.
///
/// Messages addressed to the menu route carry `open <name>` or `<name>`.
/// Anything else that lands here gets the first registered menu.
#[derive(Default)]
pub struct MenuHandler {
    menus: HashMap<String, Arc<dyn Menu>>,
    root: Option<String>,
}

impl MenuHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a menu and every submenu reachable from it
    pub fn register(&mut self, menu: Arc<dyn Menu>) -> Result<(), ConfigError> {
        let mut pending = vec![Arc::clone(&menu)];
        let mut names = Vec::new();
        while let Some(m) = pending.pop() {
            let name = m.name().to_string();
            if self.menus.contains_key(&name) || names.contains(&name) {
                return Err(ConfigError::DuplicateMenu(name));
            }
            m.validate()?;
            names.push(name);
            pending.extend(m.submenus());
        }

        // Validated as a whole so a failed registration leaves nothing behind
        let mut pending = vec![menu];
        while let Some(m) = pending.pop() {
            pending.extend(m.submenus());
            tracing::debug!("Registered menu: {}", m.name());
            self.menus.insert(m.name().to_string(), m);
        }
        if self.root.is_none() {
            self.root = names.into_iter().next();
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Menu>> {
        self.menus.get(name)
    }

    pub fn root(&self) -> Option<&Arc<dyn Menu>> {
        self.root.as_deref().and_then(|name| self.menus.get(name))
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    fn target<'a>(message: &'a InboundMessage) -> Option<&'a str> {
        if message.command.as_deref() != Some(MENU_COMMAND) {
            return None;
        }
        match message.args.as_slice() {
            [open, name, ..] if open == OPEN_MENU => Some(name.as_str()),
            [name, ..] if name != OPEN_MENU => Some(name.as_str()),
            _ => None,
        }
    }

    fn render(menu: &dyn Menu, message: &InboundMessage) -> OutgoingMessage {
        let locale = message.context.locale();
        OutgoingMessage::new(message.chat_id, menu.title_for(locale)).with_markup(menu.page_for(locale))
    }
}

#[async_trait]
impl Handler for MenuHandler {
    async fn handle(&self, message: &InboundMessage, responder: &Responder) -> HandlerResult {
        let menu = match Self::target(message) {
            Some(name) => match self.menus.get(name) {
                Some(menu) => menu,
                None => {
                    tracing::warn!("[{}] Unknown menu: {}", message.chat_id, name);
                    return Ok(None);
                }
            },
            None => match self.root() {
                Some(root) => root,
                None => return Ok(None),
            },
        };

        tracing::debug!("[{}] Rendering menu {}", message.chat_id, menu.name());
        responder.send(Self::render(menu.as_ref(), message)).await?;
        Ok(None)
    }
}
