use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use time::OffsetDateTime;

/// Partial-upload membership for one logical file.
///
/// `total` is 0 until the first chunk of the session fixes the claimed
/// count; the set of received indices is authoritative for completion.
#[derive(Debug)]
pub struct Session {
    pub total: u32,
    pub received: BTreeSet<u32>,
    pub created: OffsetDateTime,
}

impl Session {
    fn new(now: OffsetDateTime) -> Self {
        Self {
            total: 0,
            received: BTreeSet::new(),
            created: now,
        }
    }

    /// Complete iff every index in [1, total] has been received. Indices
    /// are validated against the total before insertion, so a full set
    /// implies no gaps.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.received.len() as u32 == self.total
    }
}

/// Registry of active upload sessions, keyed by sanitized file name.
///
/// The per-entry mutex is the advisory lock guarding the
/// completion-check-and-assemble sequence; chunk persistence and
/// verification run outside of it.
#[derive(Default)]
pub struct SessionMap {
    inner: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Fetch or create the session entry for `name`.
    pub fn entry(&self, name: &str) -> Arc<Mutex<Session>> {
        self.inner
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(OffsetDateTime::now_utc()))))
            .value()
            .clone()
    }

    pub fn remove(&self, name: &str) {
        self.inner.remove(name);
    }

    /// Remove sessions older than `ttl` and return them as (name, total)
    /// pairs. Leftover chunk artifacts are the caller's to delete.
    ///
    /// Entries are snapshotted before any session mutex is taken, so this
    /// never holds a map shard and a session lock at the same time.
    pub fn take_expired(&self, ttl: Duration) -> Vec<(String, u32)> {
        let cutoff = OffsetDateTime::now_utc() - ttl;
        let snapshot: Vec<(String, Arc<Mutex<Session>>)> = self
            .inner
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut reaped = Vec::new();
        for (name, entry) in snapshot {
            let expired = entry.lock().map(|s| s.created < cutoff).unwrap_or(true);
            if expired {
                if let Some((name, entry)) = self.inner.remove(&name) {
                    let total = entry.lock().map(|s| s.total).unwrap_or(0);
                    reaped.push((name, total));
                }
            }
        }
        reaped
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
