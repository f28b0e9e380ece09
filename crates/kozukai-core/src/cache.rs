//! Time-bounded snapshot of fetched records
//!
//! A snapshot is immutable once stored: presenters hold an `Arc` to the
//! record list and compute reports from it without holding any lock.
//! Staleness is a pure function of the fetch time, the caller's clock and
//! the configured TTL, so it is testable without waiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::ExpenseRecord;
use crate::source::{load_records, DataSource};

/// One fetch's worth of normalized records
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Arc<Vec<ExpenseRecord>>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<ExpenseRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            records: Arc::new(records),
            fetched_at,
        }
    }

    /// Whether the snapshot is at least `ttl` old at `now`.
    ///
    /// A zero TTL makes every snapshot stale. A `now` earlier than the fetch
    /// time (clock skew) counts as fresh.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.fetched_at).to_std() {
            Ok(age) => age >= ttl,
            Err(_) => false,
        }
    }
}

/// Read-through cache holding at most one snapshot
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    ttl: Duration,
    current: Option<Snapshot>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached snapshot, if there is one and it is still fresh at `now`
    pub fn get(&self, now: DateTime<Utc>) -> Option<Snapshot> {
        self.current
            .as_ref()
            .filter(|s| !s.is_stale(now, self.ttl))
            .cloned()
    }

    pub fn store(&mut self, snapshot: Snapshot) {
        self.current = Some(snapshot);
    }

    /// Drop the cached snapshot so the next read fetches again
    pub fn invalidate(&mut self) {
        if self.current.take().is_some() {
            debug!("Snapshot cache invalidated");
        }
    }

    /// Return the fresh snapshot or fetch a new one from `source`
    pub fn get_or_load(&mut self, source: &dyn DataSource, now: DateTime<Utc>) -> Snapshot {
        if let Some(snapshot) = self.get(now) {
            return snapshot;
        }
        debug!(source = source.name(), "Snapshot missing or stale, fetching");
        let snapshot = Snapshot::new(load_records(source), now);
        self.store(snapshot.clone());
        snapshot
    }
}
