pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod notify;
pub mod poller;
pub mod resolver;
pub mod server;
pub mod state;
pub mod types;
pub mod watcher;

/// Torn public API base URL.
pub const TORN_API_BASE: &str = "https://api.torn.com";

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Log title Torn uses for incoming money transfers.
pub const MONEY_RECEIVE_TITLE: &str = "Money receive";

/// Default polling interval per watched account.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Default number of notifications kept for the live view.
pub const DEFAULT_LOG_CAPACITY: usize = 50;
