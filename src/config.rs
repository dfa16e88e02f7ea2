use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::parse_base_url;
use crate::types::WatchedAccount;
use crate::{DEFAULT_LOG_CAPACITY, DEFAULT_POLL_INTERVAL_SECS, TELEGRAM_API_BASE, TORN_API_BASE};

/// Default config file path used by `--config` without an argument.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config, from `config.toml` or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat sink; disabled when absent.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub accounts: Vec<WatchedAccount>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Telegram bot credentials and destination chat.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Polling interval in seconds, per account.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Notifications kept for the live view.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Skip a tick while the previous poll of the same account is running.
    #[serde(default)]
    pub skip_overlapping_polls: bool,
    #[serde(default = "default_torn_api_base")]
    pub torn_api_base: String,
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_torn_api_base() -> String {
    TORN_API_BASE.to_string()
}

fn default_telegram_api_base() -> String {
    TELEGRAM_API_BASE.to_string()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            log_capacity: default_log_capacity(),
            skip_overlapping_polls: false,
            torn_api_base: default_torn_api_base(),
            telegram_api_base: default_telegram_api_base(),
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load config from process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an environment-style lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut server = ServerConfig::default();
        if let Some(port) = get("PORT") {
            server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, None) => None,
            _ => anyhow::bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together"),
        };

        let mut settings = SettingsConfig::default();
        if let Some(secs) = get("POLL_INTERVAL_SECS") {
            settings.poll_interval_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("POLL_INTERVAL_SECS is not a number: {secs}"))?;
        }
        if let Some(base) = get("TORN_API_BASE") {
            settings.torn_api_base = base;
        }
        if let Some(base) = get("TELEGRAM_API_BASE") {
            settings.telegram_api_base = base;
        }

        let accounts = match get("FRIENDS") {
            Some(raw) => serde_json::from_str(&raw).context("FRIENDS is not a JSON account list")?,
            None => Vec::new(),
        };

        Ok(Self {
            server,
            telegram,
            settings,
            accounts,
        })
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.settings.poll_interval_secs == 0 {
            anyhow::bail!("poll interval must be at least 1 second");
        }
        if self.settings.log_capacity == 0 {
            anyhow::bail!("log capacity must be at least 1");
        }
        parse_base_url(&self.settings.torn_api_base)
            .with_context(|| format!("invalid Torn API base {}", self.settings.torn_api_base))?;
        parse_base_url(&self.settings.telegram_api_base).with_context(|| {
            format!("invalid Telegram API base {}", self.settings.telegram_api_base)
        })?;

        let mut names = HashSet::new();
        for account in &self.accounts {
            if account.name.trim().is_empty() {
                anyhow::bail!("account with empty name");
            }
            if account.api_key.trim().is_empty() {
                anyhow::bail!("account {} has an empty API key", account.name);
            }
            if !names.insert(account.name.as_str()) {
                anyhow::bail!("duplicate account name {}", account.name);
            }
        }
        if self.accounts.is_empty() {
            warn!("No accounts configured; nothing will be polled");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.settings.poll_interval_secs)
    }
}
