//! Telegram Bot API transport, using long polling.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tcbot_core::{ConversationId, Incoming};
use tracing::{debug, trace, warn};

use crate::transport::{Transport, TransportError};

/// Maximum length of a single Telegram message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TransportError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TransportError::Api(
                self.description.unwrap_or_else(|| "missing result".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// The identity operators refer to a user by: the username if set, else the full name.
    pub fn identity(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return username.to_string();
        }

        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

impl Update {
    /// Converts the update into an operator message. New and edited messages are treated the
    /// same; anything without text or sender is skipped.
    pub fn into_incoming(self) -> Option<Incoming> {
        let message = self.message.or(self.edited_message)?;
        let sender = message.from?.identity();
        let text = message.text?;

        Some(Incoming::new(sender, message.chat.id, text))
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct NoParams {}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Splits `text` into chunks Telegram accepts, on character boundaries.
pub fn split_message(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest.char_indices().nth(MAX_MESSAGE_CHARS).map_or(rest.len(), |(i, _)| i);
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Telegram bot client. Clones share the update offset.
#[derive(Clone)]
pub struct Telegram {
    client: reqwest::Client,
    base: String,
    poll_timeout: Duration,
    /// Next update id to request. Updates below it are acknowledged.
    offset: Arc<AtomicI64>,
}

impl std::fmt::Debug for Telegram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `base` embeds the token.
        f.debug_struct("Telegram")
            .field("poll_timeout", &self.poll_timeout)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl Telegram {
    pub fn new(
        api_url: &str,
        token: &str,
        poll_timeout: Duration,
    ) -> Result<Self, TransportError> {
        // The HTTP timeout must outlast the long poll.
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(reqwest::Error::without_url)?;

        Ok(Self {
            client,
            base: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            poll_timeout,
            offset: Arc::new(AtomicI64::new(0)),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // Request errors carry the URL, which contains the token.
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.base))
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        response.into_result()
    }

    /// Advances the offset past `updates` and returns the messages they carry.
    ///
    /// Updates are decoded one by one. An update that does not decode is still acknowledged,
    /// so it is not delivered again.
    fn acknowledge(&self, updates: Vec<serde_json::Value>) -> Vec<Incoming> {
        let mut messages = Vec::with_capacity(updates.len());
        for raw in updates {
            if let Some(update_id) = raw.get("update_id").and_then(serde_json::Value::as_i64) {
                self.offset.fetch_max(update_id + 1, Ordering::SeqCst);
                trace!(update_id, "received update");
            }

            match serde_json::from_value::<Update>(raw) {
                Ok(update) => messages.extend(update.into_incoming()),
                Err(e) => warn!(error = %e, "skipping undecodable update"),
            }
        }
        messages
    }
}

#[async_trait::async_trait]
impl Transport for Telegram {
    async fn connect(&self) -> Result<String, TransportError> {
        let me: User = self.call("getMe", &NoParams {}).await?;
        Ok(me.username.unwrap_or(me.first_name))
    }

    async fn receive(&self) -> Result<Vec<Incoming>, TransportError> {
        let request = GetUpdates {
            offset: self.offset.load(Ordering::SeqCst),
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message", "edited_message"],
        };

        let updates: Vec<serde_json::Value> = self.call("getUpdates", &request).await?;
        Ok(self.acknowledge(updates))
    }

    async fn send(&self, conversation: ConversationId, text: &str) -> Result<(), TransportError> {
        for chunk in split_message(text) {
            debug!(conversation, chars = chunk.chars().count(), "sending reply");
            let _: serde::de::IgnoredAny =
                self.call("sendMessage", &SendMessage { chat_id: conversation, text: chunk }).await?;
        }
        Ok(())
    }
}
