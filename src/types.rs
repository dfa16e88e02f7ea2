use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Torn account whose incoming transfers are watched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedAccount {
    /// Display label used in notifications and as the dedup key.
    pub name: String,
    /// Torn API key with access to the account's log.
    #[serde(alias = "apiKey")]
    pub api_key: String,
}

impl fmt::Debug for WatchedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedAccount")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// One entry of the `log` selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub log: Option<i64>,
    pub title: String,
    pub timestamp: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Torn returns an empty log as `[]` and a populated one as an id-keyed map.
///
/// Entries stay raw here and are decoded one at a time, so a single entry of
/// an unexpected shape cannot fail the whole log.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogPayload {
    Map(HashMap<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

impl LogPayload {
    pub fn into_raw_entries(self) -> Vec<serde_json::Value> {
        match self {
            LogPayload::Map(map) => map.into_values().collect(),
            LogPayload::List(list) => list,
        }
    }
}

/// Response of `user/?selections=log`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogResponse {
    #[serde(default)]
    pub log: Option<LogPayload>,
}

/// Response of `user/{id}?selections=profile` (only the fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
}

/// Body of a Torn `error` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub error: String,
}

/// `data` payload of a money-receive log entry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoneyReceiveData {
    pub sender: u64,
    pub money: u64,
}

/// A decoded money-receive event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyReceive {
    pub timestamp: i64,
    pub sender: u64,
    pub money: u64,
}

impl MoneyReceive {
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// A notification as shown to viewers and kept in the recent log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub text: String,
    /// Event time in unix seconds.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_accepts_camel_case_key() {
        let account: WatchedAccount =
            serde_json::from_value(json!({ "name": "Alice", "apiKey": "k1" })).unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.api_key, "k1");
    }

    #[test]
    fn account_debug_hides_key() {
        let account = WatchedAccount {
            name: "Alice".to_string(),
            api_key: "secret".to_string(),
        };
        let printed = format!("{account:?}");
        assert!(printed.contains("Alice"));
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn log_response_map_form() {
        let resp: LogResponse = serde_json::from_value(json!({
            "log": {
                "abc": {
                    "log": 4810,
                    "title": "Money receive",
                    "timestamp": 1000,
                    "category": "Money",
                    "data": { "sender": 55, "money": 500 }
                }
            }
        }))
        .unwrap();
        let entries = resp.log.unwrap().into_raw_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["timestamp"], 1000);
    }

    #[test]
    fn log_response_empty_forms() {
        let resp: LogResponse = serde_json::from_value(json!({ "log": [] })).unwrap();
        assert!(resp.log.unwrap().into_raw_entries().is_empty());

        let resp: LogResponse = serde_json::from_value(json!({ "log": null })).unwrap();
        assert!(resp.log.is_none());

        let resp: LogResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.log.is_none());
    }

    #[test]
    fn log_payload_keeps_odd_entries_raw() {
        let resp: LogResponse = serde_json::from_value(json!({
            "log": {
                "a": { "title": "Money receive", "timestamp": 1000, "data": {} },
                "b": { "log": 9999, "timestamp": 900, "category": "Other", "data": {} }
            }
        }))
        .unwrap();
        assert_eq!(resp.log.unwrap().into_raw_entries().len(), 2);
    }

    #[test]
    fn money_receive_event_time() {
        let m = MoneyReceive {
            timestamp: 1000,
            sender: 55,
            money: 500,
        };
        assert_eq!(m.event_time().unwrap().timestamp(), 1000);
    }
}
