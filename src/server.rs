use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::Stream;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{error, info, warn};

use crate::types::NotificationRecord;
use crate::watcher::Watcher;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Torn Money Watcher</title>
  <style>
    body { font-family: Arial, sans-serif; background: #111; color: #fff; }
    h1 { color: #0f0; }
    .log { margin-bottom: 8px; padding: 6px; background: #222; border-radius: 4px; }
    .time { color: #888; font-size: 0.85em; }
  </style>
</head>
<body>
  <h1>Torn Money Watcher</h1>
  <div id="logs"></div>
  <script>
    const logsDiv = document.getElementById("logs");

    function render(record, atTop) {
      const logEl = document.createElement("div");
      logEl.className = "log";
      const text = document.createElement("div");
      text.textContent = record.text;
      const time = document.createElement("div");
      time.className = "time";
      time.textContent = new Date(record.timestamp * 1000).toLocaleString();
      logEl.appendChild(text);
      logEl.appendChild(time);
      if (atTop) {
        logsDiv.insertBefore(logEl, logsDiv.firstChild);
      } else {
        logsDiv.appendChild(logEl);
      }
    }

    function subscribe() {
      const evtSource = new EventSource("/events");
      evtSource.onmessage = (event) => render(JSON.parse(event.data), true);
    }

    fetch("/logs")
      .then((resp) => resp.json())
      .then((records) => records.forEach((r) => render(r, false)))
      .catch(() => {})
      .finally(subscribe);
  </script>
</body>
</html>
"#;

/// HTTP surface: live page, SSE stream, buffered history and health.
pub fn router(watcher: Arc<Watcher>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/events", get(stream_events))
        .route("/logs", get(recent_logs))
        .route("/health", get(health))
        .with_state(watcher)
}

/// Bind `0.0.0.0:port` and serve until the task is dropped.
pub async fn serve(watcher: Arc<Watcher>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("[Torn Money Watcher] Running at http://localhost:{port}");
    axum::serve(listener, router(watcher))
        .await
        .context("HTTP server failed")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Each connection is one broadcast receiver, dropped when the client leaves.
/// History is not replayed here; the page loads it from `/logs`.
async fn stream_events(
    State(watcher): State<Arc<Watcher>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(watcher.broadcaster.subscribe());
    info!(
        "Live viewer connected ({} open)",
        watcher.broadcaster.viewer_count()
    );
    let stream = tokio_stream::StreamExt::filter_map(receiver, |item| match item {
        Ok(record) => match SseEvent::default().json_data(&record) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                error!("Failed to serialize notification for SSE: {e}");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!("Live viewer lagged; skipped {skipped} notification(s)");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn recent_logs(State(watcher): State<Arc<Watcher>>) -> Json<Vec<NotificationRecord>> {
    Json(watcher.recent.snapshot())
}

async fn health(State(watcher): State<Arc<Watcher>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "accounts": watcher.accounts.len(),
        "viewers": watcher.broadcaster.viewer_count(),
    }))
}
