use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::NotificationRecord;

/// Critical sections here never panic mid-update, so a poisoned lock still
/// holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Newest notified money-receive timestamp per account label.
#[derive(Debug, Default)]
pub struct LastSeenRegistry {
    seen: Mutex<HashMap<String, i64>>,
}

impl LastSeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &str) -> Option<i64> {
        lock(&self.seen).get(account).copied()
    }

    /// Record `timestamp` for `account` if it is newer than what was seen.
    ///
    /// Returns `true` when the caller should notify. Check and update happen
    /// under one lock so overlapping polls of the same account notify once.
    pub fn observe(&self, account: &str, timestamp: i64) -> bool {
        let mut seen = lock(&self.seen);
        match seen.get(account) {
            Some(&last) if timestamp <= last => false,
            _ => {
                seen.insert(account.to_string(), timestamp);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.seen).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded, newest-first buffer of emitted notifications.
#[derive(Debug)]
pub struct RecentLog {
    capacity: usize,
    records: Mutex<VecDeque<NotificationRecord>>,
}

impl RecentLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Insert at the front, evicting the oldest record past capacity.
    pub fn push(&self, record: NotificationRecord) {
        let mut records = lock(&self.records);
        records.push_front(record);
        records.truncate(self.capacity);
    }

    /// Copy of the buffer, newest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        lock(&self.records).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
