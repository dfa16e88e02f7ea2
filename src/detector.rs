use tracing::{debug, info, warn};

use crate::MONEY_RECEIVE_TITLE;
use crate::error::WatchResult;
use crate::resolver::resolve_username;
use crate::types::{LogEntry, MoneyReceive, MoneyReceiveData, NotificationRecord, WatchedAccount};
use crate::watcher::Watcher;

/// Decode a log entry as a money-receive event.
///
/// Entries with another title yield `None`. Money-receive entries whose `data`
/// lacks `sender` or `money` are skipped with a warning.
pub fn money_receive(entry: &LogEntry) -> Option<MoneyReceive> {
    if entry.title != MONEY_RECEIVE_TITLE {
        return None;
    }
    match serde_json::from_value::<MoneyReceiveData>(entry.data.clone()) {
        Ok(data) => Some(MoneyReceive {
            timestamp: entry.timestamp,
            sender: data.sender,
            money: data.money,
        }),
        Err(e) => {
            warn!(
                "Skipping malformed money-receive entry at {}: {e}",
                entry.timestamp
            );
            None
        }
    }
}

/// Newest money-receive event among `entries`.
///
/// Equal timestamps are broken by the larger amount, then the larger sender id.
pub fn latest_money_receive(entries: &[LogEntry]) -> Option<MoneyReceive> {
    entries
        .iter()
        .filter_map(money_receive)
        .max_by_key(|m| (m.timestamp, m.money, m.sender))
}

/// Human-readable notification text.
pub fn format_notification(account: &str, money: u64, sender_label: &str) -> String {
    format!("💰 {account} just received ${money} from {sender_label}")
}

impl Watcher {
    /// One detection cycle for `account`.
    ///
    /// Returns the emitted record, or `None` when there was nothing new.
    pub async fn check_account(
        &self,
        account: &WatchedAccount,
    ) -> WatchResult<Option<NotificationRecord>> {
        let Some(entries) = self.torn.fetch_log(&account.api_key).await? else {
            debug!("[{}] No log returned", account.name);
            return Ok(None);
        };

        let Some(latest) = latest_money_receive(&entries) else {
            debug!("[{}] No money-receive entries", account.name);
            return Ok(None);
        };

        if !self.registry.observe(&account.name, latest.timestamp) {
            debug!(
                "[{}] Newest transfer at {} already notified",
                account.name, latest.timestamp
            );
            return Ok(None);
        }

        let sender = resolve_username(&self.torn, latest.sender, &account.api_key).await;
        let text = format_notification(&account.name, latest.money, &sender);
        match latest.event_time() {
            Some(at) => info!("[NOTIFY] {text} (at {})", at.to_rfc3339()),
            None => info!("[NOTIFY] {text}"),
        }

        let record = NotificationRecord {
            text,
            timestamp: latest.timestamp,
        };
        self.publish(record.clone()).await;
        Ok(Some(record))
    }

    /// Run [`Watcher::check_account`], logging and swallowing any failure.
    pub async fn poll_account(&self, account: &WatchedAccount) {
        if let Err(e) = self.check_account(account).await {
            warn!("[{}] Fetching logs failed: {e}", account.name);
        }
    }
}
