use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{WatchError, WatchResult};
use crate::types::{ApiErrorBody, LogEntry, LogResponse, ProfileResponse};

/// Parse a base URL and make sure relative joins append to its path.
pub fn parse_base_url(base: &str) -> WatchResult<Url> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Decode a Torn response body, surfacing the in-band `error` object first.
pub fn decode_response<T: DeserializeOwned>(body: Value) -> WatchResult<T> {
    if let Some(err) = body.get("error") {
        let err: ApiErrorBody = serde_json::from_value(err.clone())
            .map_err(|e| WatchError::Malformed(format!("unreadable error body: {e}")))?;
        return Err(WatchError::Api {
            code: err.code,
            message: err.error,
        });
    }
    serde_json::from_value(body).map_err(|e| WatchError::Malformed(e.to_string()))
}

/// Decode raw log entries one at a time, skipping any that do not fit
/// [`LogEntry`] so the rest of the log is still usable.
pub fn decode_log_entries(raw: Vec<Value>) -> Vec<LogEntry> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<LogEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable log entry: {e}");
                None
            }
        })
        .collect()
}

/// Thin client over the two Torn endpoints the watcher needs.
#[derive(Debug, Clone)]
pub struct TornClient {
    http: Client,
    base: Url,
}

impl TornClient {
    pub fn new(http: Client, base: &str) -> WatchResult<Self> {
        Ok(Self {
            http,
            base: parse_base_url(base)?,
        })
    }

    /// Fetch the recent activity log of the key's owner.
    ///
    /// Returns `None` when the response carries no log at all.
    pub async fn fetch_log(&self, api_key: &str) -> WatchResult<Option<Vec<LogEntry>>> {
        let url = self.base.join("user/")?;
        let body: Value = self
            .http
            .get(url)
            .query(&[("selections", "log"), ("key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let resp: LogResponse = decode_response(body)?;
        let entries = resp
            .log
            .map(|payload| decode_log_entries(payload.into_raw_entries()));
        debug!(
            "Fetched {} log entries",
            entries.as_ref().map(Vec::len).unwrap_or(0)
        );
        Ok(entries)
    }

    /// Fetch the public profile of `user_id`.
    pub async fn fetch_profile(&self, user_id: u64, api_key: &str) -> WatchResult<ProfileResponse> {
        let url = self.base.join(&format!("user/{user_id}"))?;
        let body: Value = self
            .http
            .get(url)
            .query(&[("selections", "profile"), ("key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        decode_response(body)
    }
}
