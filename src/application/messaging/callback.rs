//! Callback processor - turns handler callbacks into sends or re-dispatches

use super::parser::MessageParser;
use super::responder::Responder;
use crate::domain::entities::{Callback, CallbackType, InboundMessage, MENU_COMMAND, OPEN_MENU};
use crate::domain::traits::OutgoingMessage;

/// What the dispatcher should do after a callback was processed
#[derive(Debug)]
pub enum CallbackOutcome {
    Done,
    Redispatch(InboundMessage),
}

/// Stateless classifier over the four callback types
#[derive(Debug, Clone, Default)]
pub struct CallbackProcessor {
    parser: MessageParser,
}

impl CallbackProcessor {
    pub fn new(parser: MessageParser) -> Self {
        Self { parser }
    }

    pub async fn process(
        &self,
        callback: Callback,
        mut message: InboundMessage,
        responder: &Responder,
    ) -> CallbackOutcome {
        match callback.kind {
            CallbackType::Bad => {
                tracing::error!("[{}] Untyped callback for message {}", message.chat_id, message.text);
                CallbackOutcome::Done
            }
            CallbackType::CallCommand => {
                self.rewrite(&mut message, callback.command, callback.args);
                CallbackOutcome::Redispatch(message)
            }
            CallbackType::OpenMenu => {
                if let Some(menu) = &callback.menu {
                    let locale = callback.locale.as_deref().or(message.context.locale());
                    let text = callback
                        .text
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| menu.title_for(locale).to_string());
                    let chat_id = callback.chat_id.unwrap_or(message.chat_id);
                    let out = OutgoingMessage::new(chat_id, text).with_markup(menu.page_for(locale));

                    if let Err(e) = responder.send(out).await {
                        tracing::error!("[{}] Error handling callback: {}", message.chat_id, e);
                    }
                    return CallbackOutcome::Done;
                }
                let args = vec![OPEN_MENU.to_string(), callback.command];
                self.rewrite(&mut message, MENU_COMMAND.to_string(), args);
                CallbackOutcome::Redispatch(message)
            }
            CallbackType::TransitToMenu => {
                self.rewrite(&mut message, MENU_COMMAND.to_string(), vec![callback.command]);
                CallbackOutcome::Redispatch(message)
            }
        }
    }

    /// Make the message look as if the user typed `command args`
    fn rewrite(&self, message: &mut InboundMessage, command: String, args: Vec<String>) {
        message.text = self.parser.compose(&command, &args);
        message.command = Some(command);
        message.args = args;
    }
}
