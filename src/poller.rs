//! Fixed-rate polling of every watched account.
//!
//! Each account gets its own timer task. Every tick spawns a detection cycle
//! without waiting for the previous one, so a slow API call for one account
//! never delays the others.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::types::WatchedAccount;
use crate::watcher::Watcher;

/// Start one polling task per account. The first tick fires immediately.
///
/// With `skip_overlapping`, a tick is dropped while the previous cycle for
/// the same account is still running.
pub fn start(watcher: Arc<Watcher>, period: Duration, skip_overlapping: bool) -> Vec<JoinHandle<()>> {
    info!(
        "Polling {} account(s) every {}s",
        watcher.accounts.len(),
        period.as_secs_f64()
    );
    watcher
        .accounts
        .iter()
        .cloned()
        .map(|account| spawn_account(Arc::clone(&watcher), account, period, skip_overlapping))
        .collect()
}

fn spawn_account(
    watcher: Arc<Watcher>,
    account: WatchedAccount,
    period: Duration,
    skip_overlapping: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let account = Arc::new(account);
        let in_flight = Arc::new(AtomicBool::new(false));
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            if skip_overlapping && in_flight.swap(true, Ordering::AcqRel) {
                debug!("[{}] Previous poll still running, skipping tick", account.name);
                continue;
            }

            let watcher = Arc::clone(&watcher);
            let account = Arc::clone(&account);
            let in_flight = Arc::clone(&in_flight);
            tokio::spawn(async move {
                watcher.poll_account(&account).await;
                in_flight.store(false, Ordering::Release);
            });
        }
    })
}
