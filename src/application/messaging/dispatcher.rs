//! Message dispatcher - Routes inbound events to the active handler

use std::collections::HashMap;
use std::sync::Arc;

use super::callback::{CallbackOutcome, CallbackProcessor};
use super::parser::MessageParser;
use super::responder::{Outbox, Responder};
use crate::domain::entities::{Callback, ChatId, CommandRegistry, InboundMessage, Update, MENU_COMMAND};
use crate::domain::traits::{ContextProvider, Handler, Transport};

/// Default bound on callback re-dispatches per inbound event
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Routes inbound events to handlers and tracks the active handler of each
/// conversation.
///
/// Owned by the inbound task, so conversation state needs no locking.
pub struct Dispatcher {
    parser: MessageParser,
    processor: CallbackProcessor,
    registry: CommandRegistry,
    chats: HashMap<ChatId, Arc<dyn Handler>>,
    context: Arc<dyn ContextProvider>,
    transport: Arc<dyn Transport>,
    outgoing: Outbox,
    max_depth: usize,
}

impl Dispatcher {
    pub fn new(
        parser: MessageParser,
        registry: CommandRegistry,
        context: Arc<dyn ContextProvider>,
        transport: Arc<dyn Transport>,
        outgoing: Outbox,
    ) -> Self {
        Self {
            processor: CallbackProcessor::new(parser.clone()),
            parser,
            registry,
            chats: HashMap::new(),
            context,
            transport,
            outgoing,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether a conversation currently has an active handler
    pub fn has_active_handler(&self, chat_id: ChatId) -> bool {
        self.chats.contains_key(&chat_id)
    }

    /// Process one inbound event to completion
    pub async fn handle_update(&mut self, update: Update) {
        let pressed = if let Update::CallbackQuery { id, .. } = &update {
            if let Err(e) = self.transport.answer_callback(id).await {
                tracing::error!("Failed to answer callback {}: {}", id, e);
            }
            true
        } else {
            false
        };

        let mut message = InboundMessage::from(update);
        if let Some(sender) = &message.sender {
            tracing::debug!("[{}] {} from {}", message.chat_id, message.text, sender);
        }
        if pressed {
            if let Ok(callback) = Callback::decode(&message.text) {
                if self.resolve_context(&mut message) {
                    self.run(message, Some(callback)).await;
                }
                return;
            }
        }

        self.parser.parse(&mut message);
        self.run(message, None).await;
    }

    /// Dispatch a message, following callbacks until none is left or the
    /// depth bound is hit
    pub async fn run(&mut self, mut message: InboundMessage, mut pending: Option<Callback>) {
        let mut depth = 0;
        loop {
            let callback = match pending.take() {
                Some(callback) => callback,
                None => match self.route(&mut message).await {
                    Some(callback) => callback,
                    None => return,
                },
            };

            let responder = Responder::new(message.chat_id, self.outgoing.clone())
                .with_locale(message.context.locale());
            match self.processor.process(callback, message, &responder).await {
                CallbackOutcome::Done => return,
                CallbackOutcome::Redispatch(next) => {
                    depth += 1;
                    if depth > self.max_depth {
                        tracing::warn!(
                            "[{}] Re-dispatch depth {} exceeded, dropping {}",
                            next.chat_id,
                            self.max_depth,
                            next.text
                        );
                        return;
                    }
                    tracing::debug!("[{}] Re-dispatching as {}", next.chat_id, next.text);
                    message = next;
                }
            }
        }
    }

    /// Resolve the handler for one message, invoke it and return its callback
    async fn route(&mut self, message: &mut InboundMessage) -> Option<Callback> {
        let chat_id = message.chat_id;
        let mut handler = None;

        if let Some(command) = message.command.as_deref() {
            if command == MENU_COMMAND {
                // Menu navigation keeps the conversation's handler
                handler = self.registry.handler(MENU_COMMAND);
                if handler.is_none() {
                    tracing::debug!("[{}] No menus registered, dropping: {}", chat_id, message.text);
                    return None;
                }
            } else {
                if let Some(previous) = self.chats.remove(&chat_id) {
                    previous.dump(chat_id);
                }
                handler = self.registry.handler(command);
                match &handler {
                    Some(h) => {
                        self.chats.insert(chat_id, Arc::clone(h));
                    }
                    None => tracing::debug!("[{}] No handler for command {}", chat_id, command),
                }
            }
        }

        if !self.resolve_context(message) {
            return None;
        }

        let handler = match handler.or_else(|| self.chats.get(&chat_id).cloned()) {
            Some(handler) => handler,
            None => match self.registry.handler(MENU_COMMAND) {
                Some(menu) => menu,
                None => {
                    tracing::debug!("[{}] No active handler, dropping: {}", chat_id, message.text);
                    return None;
                }
            },
        };

        let responder = Responder::new(chat_id, self.outgoing.clone()).with_locale(message.context.locale());
        match handler.handle(message, &responder).await {
            Ok(callback) => callback,
            Err(e) => {
                tracing::warn!("[{}] Handler failed: {}", chat_id, e);
                None
            }
        }
    }

    fn resolve_context(&self, message: &mut InboundMessage) -> bool {
        match self.context.context(message) {
            Ok(ctx) => {
                message.context = ctx;
                true
            }
            Err(e) => {
                tracing::warn!("[{}] Context resolution failed: {}", message.chat_id, e);
                false
            }
        }
    }
}
