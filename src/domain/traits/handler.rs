use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::application::messaging::Responder;
use crate::domain::entities::{Callback, ChatId, InboundMessage, RequestContext};

/// What a handler hands back to the dispatcher.
///
/// `Some(callback)` is routed through the callback processor. Replies are
/// sent through the responder, so `None` means the handler is done.
pub type HandlerResult = Result<Option<Callback>, BotError>;

/// Handler trait - application logic bound to a command
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, message: &InboundMessage, responder: &Responder) -> HandlerResult;

    /// Called when the conversation switches to another handler
    fn dump(&self, _chat_id: ChatId) {}
}

/// Handler built from a plain function returning reply text
pub struct FnHandler<F> {
    reply: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&InboundMessage) -> Option<String> + Send + Sync,
{
    pub fn new(reply: F) -> Self {
        Self { reply }
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&InboundMessage) -> Option<String> + Send + Sync,
{
    async fn handle(&self, message: &InboundMessage, responder: &Responder) -> HandlerResult {
        if let Some(text) = (self.reply)(message) {
            responder.send_text(text).await?;
        }
        Ok(None)
    }
}

/// Resolves the request context of an inbound message.
///
/// An error aborts processing of that message only.
pub trait ContextProvider: Send + Sync {
    fn context(&self, message: &InboundMessage) -> Result<RequestContext, BotError>;
}

impl<F> ContextProvider for F
where
    F: Fn(&InboundMessage) -> Result<RequestContext, BotError> + Send + Sync,
{
    fn context(&self, message: &InboundMessage) -> Result<RequestContext, BotError> {
        self(message)
    }
}

/// Provider used when the application sets none
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContext;

impl ContextProvider for EmptyContext {
    fn context(&self, _message: &InboundMessage) -> Result<RequestContext, BotError> {
        Ok(RequestContext::default())
    }
}
