//! Telegram adapter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatId, Command, ReplyMarkup, Update as InboundUpdate, User as Sender};
use crate::domain::traits::Transport;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Pause after a failed poll before trying again
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Deserialize)]
struct Response<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> Response<T> {
    fn into_result(self) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Network(format!(
                "Telegram API error: {}",
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

impl From<User> for Sender {
    fn from(user: User) -> Self {
        Sender {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
        }
    }
}

impl Update {
    /// Convert to an inbound event; updates without text or data are skipped
    pub fn into_inbound(self) -> Option<InboundUpdate> {
        if let Some(query) = self.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            return Some(InboundUpdate::CallbackQuery {
                id: query.id,
                chat_id,
                sender: query.from.into(),
                data: query.data.unwrap_or_default(),
            });
        }

        let message = self.message?;
        Some(InboundUpdate::Message {
            chat_id: message.chat.id,
            sender: message.from.map(Sender::from),
            text: message.text?,
        })
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    poll_timeout: u64,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, poll_timeout: u64) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            poll_timeout,
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<Req, T>(&self, method: &str, request: &Req) -> Result<T, BotError>
    where
        Req: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: Response<T> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        data.into_result()
    }

    /// Fetch the bot's username
    pub async fn get_me(&self) -> Result<String, BotError> {
        #[derive(Deserialize)]
        struct Me {
            username: String,
        }

        let me: Me = self.call("getMe", &serde_json::json!({})).await?;
        Ok(me.username)
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
            allowed_updates: vec!["message".to_string(), "callback_query".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(current: i64, updates: &[Update]) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
            .max(current)
    }

    /// Long-poll updates into `tx` until the receiving side is dropped
    pub async fn poll_updates(&self, tx: mpsc::Sender<InboundUpdate>) {
        let mut offset: i64 = 0;
        tracing::info!("Starting update polling...");

        loop {
            let result = tokio::select! {
                _ = tx.closed() => break,
                result = self.get_updates(offset) => result,
            };

            match result {
                Ok(updates) => {
                    if !updates.is_empty() {
                        tracing::debug!("Received {} updates", updates.len());
                    }
                    offset = Self::get_next_offset(offset, &updates);
                    for update in updates.into_iter().filter_map(Update::into_inbound) {
                        if tx.send(update).await.is_err() {
                            tracing::info!("Update receiver closed");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Polling failed: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }

        tracing::info!("Stopped update polling");
    }

    /// Publish registered commands with Telegram
    pub async fn register_commands(&self, commands: &[&Command]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct BotCommand {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<BotCommand>,
        }

        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|c| BotCommand {
                    command: c.name.clone(),
                    description: c.description.clone().unwrap_or_else(|| c.name.clone()),
                })
                .collect(),
        };

        let _: bool = self.call("setMyCommands", &request).await?;
        tracing::info!("Registered {} bot commands with Telegram", request.commands.len());
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramAdapter {
    async fn send(&self, chat_id: ChatId, text: &str, markup: Option<&ReplyMarkup>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: ChatId,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_markup: Option<&'a ReplyMarkup>,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        tracing::debug!("Sending to {}: {}", chat_id, text);
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: markup,
        };

        let result: MessageResult = self.call("sendMessage", &request).await?;
        tracing::debug!("Sent message {} to {}", result.message_id, chat_id);
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct AnswerRequest<'a> {
            callback_query_id: &'a str,
        }

        let _: bool = self
            .call("answerCallbackQuery", &AnswerRequest { callback_query_id: callback_id })
            .await?;
        Ok(())
    }
}
