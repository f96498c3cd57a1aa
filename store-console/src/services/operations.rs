//! Trackers for the uploads submitted through the console.
//!
//! One tracker per operation name. Finished trackers stay around so the
//! status fragment can still report the outcome. Once `retained` trackers
//! exist, adding another first drops the finished ones and then, if still
//! full, stops and evicts the oldest, pending or not.

use crate::services::operation_tracker::{
    OperationSource, OperationTracker, TrackerSnapshot, DEFAULT_MAX_POLLS,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct TrackedOperation {
    tracker: OperationTracker,
    seq: u64,
}

pub struct OperationRegistry {
    source: Arc<dyn OperationSource>,
    interval: Duration,
    max_polls: u32,
    retained: usize,
    next_seq: AtomicU64,
    trackers: DashMap<String, TrackedOperation>,
}

impl OperationRegistry {
    pub fn new(source: Arc<dyn OperationSource>, interval: Duration, retained: usize) -> Self {
        Self {
            source,
            interval,
            max_polls: DEFAULT_MAX_POLLS,
            retained: retained.max(1),
            next_seq: AtomicU64::new(0),
            trackers: DashMap::new(),
        }
    }

    /// Trackers created from now on give up after `max_polls` unfinished polls.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Start tracking `name` and return its first snapshot.
    ///
    /// Tracking a name that is already tracked keeps the existing loop.
    pub fn track(&self, name: &str) -> TrackerSnapshot {
        if !self.trackers.contains_key(name) {
            self.make_room();
        }

        let mut entry = self
            .trackers
            .entry(name.to_string())
            .or_insert_with(|| TrackedOperation {
                tracker: OperationTracker::with_interval(self.source.clone(), self.interval)
                    .with_max_polls(self.max_polls),
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            });

        let snapshot = entry.tracker.snapshot();
        let finished_same = snapshot.name.as_deref() == Some(name) && snapshot.status.is_terminal();
        if !finished_same {
            entry.tracker.set(Some(name));
        }
        entry.tracker.snapshot()
    }

    pub fn snapshot(&self, name: &str) -> Option<TrackerSnapshot> {
        self.trackers.get(name).map(|t| t.tracker.snapshot())
    }

    /// Stop tracking `name`. Returns whether it was tracked.
    pub fn cancel(&self, name: &str) -> bool {
        match self.trackers.remove(name) {
            Some((_, mut entry)) => {
                entry.tracker.stop();
                tracing::info!(operation = %name, "Stopped tracking operation");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Bring the registry below `retained` before a new tracker is added.
    fn make_room(&self) {
        if self.trackers.len() < self.retained {
            return;
        }

        let before = self.trackers.len();
        self.trackers
            .retain(|_, entry| !entry.tracker.snapshot().status.is_terminal());
        tracing::debug!(
            removed = before - self.trackers.len(),
            "Pruned finished operation trackers"
        );

        while self.trackers.len() >= self.retained {
            let oldest = self
                .trackers
                .iter()
                .min_by_key(|entry| entry.value().seq)
                .map(|entry| entry.key().clone());
            let Some(name) = oldest else { break };

            if let Some((_, mut entry)) = self.trackers.remove(&name) {
                entry.tracker.stop();
                tracing::warn!(operation = %name, "Evicted pending operation tracker");
            }
        }
    }
}
