use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::parse_base_url;
use crate::error::{WatchError, WatchResult};
use crate::types::NotificationRecord;

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct TelegramReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts notification text to a fixed Telegram chat.
///
/// No `Debug`: the endpoint URL embeds the bot token.
#[derive(Clone)]
pub struct TelegramSender {
    http: Client,
    endpoint: Url,
    chat_id: String,
}

impl TelegramSender {
    pub fn new(http: Client, base: &str, bot_token: &str, chat_id: &str) -> WatchResult<Self> {
        // Tokens contain ':', so a relative join would read `bot<id>:` as a scheme.
        let mut endpoint = parse_base_url(base)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(&format!("bot{bot_token}"))
            .push("sendMessage");
        Ok(Self {
            http,
            endpoint,
            chat_id: chat_id.to_string(),
        })
    }

    /// Send one message; fails on transport errors and on `ok: false` replies.
    pub async fn send(&self, text: &str) -> WatchResult<()> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await?;
        let status = resp.status();
        let reply: TelegramReply = resp.json().await?;
        if !status.is_success() || !reply.ok {
            return Err(WatchError::Chat(
                reply.description.unwrap_or_else(|| status.to_string()),
            ));
        }
        Ok(())
    }

    /// Fire-and-log variant: failures are logged and the message is dropped.
    pub async fn notify(&self, text: &str) {
        match self.send(text).await {
            Ok(()) => info!("[telegram] Sent: {text}"),
            Err(e) => warn!("[telegram] Send failed: {e}"),
        }
    }
}

/// Fan-out of notification records to connected live viewers.
///
/// Each viewer holds its own receiver; dropping it is the disconnect.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<NotificationRecord>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationRecord> {
        self.tx.subscribe()
    }

    /// Deliver to every open viewer; returns how many received it.
    pub fn send(&self, record: NotificationRecord) -> usize {
        match self.tx.send(record) {
            Ok(n) => n,
            Err(_) => {
                debug!("No live viewers connected");
                0
            }
        }
    }

    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
