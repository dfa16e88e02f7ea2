use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, warn};

use crate::api::TornClient;
use crate::config::AppConfig;
use crate::notify::{Broadcaster, TelegramSender};
use crate::state::{LastSeenRegistry, RecentLog};
use crate::types::{NotificationRecord, WatchedAccount};

/// Service context shared by the poller and the HTTP handlers.
pub struct Watcher {
    pub torn: TornClient,
    pub telegram: Option<TelegramSender>,
    pub registry: LastSeenRegistry,
    pub recent: RecentLog,
    pub broadcaster: Broadcaster,
    pub accounts: Vec<WatchedAccount>,
}

impl Watcher {
    pub fn new(
        torn: TornClient,
        telegram: Option<TelegramSender>,
        accounts: Vec<WatchedAccount>,
        log_capacity: usize,
    ) -> Self {
        Self {
            torn,
            telegram,
            registry: LastSeenRegistry::new(),
            recent: RecentLog::new(log_capacity),
            broadcaster: Broadcaster::new(log_capacity),
            accounts,
        }
    }

    /// Build the context from validated config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("torn-money-watcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let torn = TornClient::new(http.clone(), &config.settings.torn_api_base)
            .context("invalid Torn API base")?;

        let telegram = match &config.telegram {
            Some(tg) => Some(
                TelegramSender::new(
                    http,
                    &config.settings.telegram_api_base,
                    &tg.bot_token,
                    &tg.chat_id,
                )
                .context("invalid Telegram API base")?,
            ),
            None => {
                warn!("Telegram not configured; chat notifications disabled");
                None
            }
        };

        Ok(Self::new(
            torn,
            telegram,
            config.accounts.clone(),
            config.settings.log_capacity,
        ))
    }

    /// Fan a notification out to the recent log, live viewers and the chat.
    pub async fn publish(&self, record: NotificationRecord) {
        self.recent.push(record.clone());
        let viewers = self.broadcaster.send(record.clone());
        info!("Pushed to {viewers} live viewer(s)");
        if let Some(telegram) = &self.telegram {
            telegram.notify(&record.text).await;
        }
    }
}
