//! Polling tracker for long-running operations.
//!
//! A tracker watches at most one operation at a time. Watching moves it to
//! `Pending` and spawns a single task that fetches the operation right away
//! and then every `interval` until the operation finishes or a fetch fails:
//!
//! ```text
//! Idle --watch--> Pending --done, no error--> Done
//!                    |  \--done with error--> Error
//!                    |   \-fetch failed-----> Error
//!                    \--stop--> Idle
//! ```
//!
//! A loop that sees `max_polls` unfinished results gives up and ends in
//! `Error`, so a name that never completes does not poll forever.
//!
//! Polls within a loop are sequential, so two fetches for the same operation
//! are never in flight together. Failed fetches are not retried; the caller
//! decides whether to submit again.
//!
//! Every state write carries the generation it was started under and is
//! dropped if the tracker has since been stopped or re-pointed. The check and
//! the write happen under the watch channel's lock, so a response that lands
//! after `stop()` can never move the tracker out of `Idle`.

use crate::models::Operation;
use crate::services::metrics::record_operation_poll;
use crate::services::ApiError;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of unfinished polls before giving up (30 minutes at 2 s).
pub const DEFAULT_MAX_POLLS: u32 = 900;

/// Anything that can fetch an operation by name.
#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn get_operation(&self, name: &str) -> Result<Operation, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Idle,
    Pending,
    Done,
    Error,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Done | OperationStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Idle => "idle",
            OperationStatus::Pending => "pending",
            OperationStatus::Done => "done",
            OperationStatus::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationStatus::Idle => "Idle",
            OperationStatus::Pending => "Processing",
            OperationStatus::Done => "Completed",
            OperationStatus::Error => "Failed",
        }
    }
}

/// What a tracker currently knows.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    /// Operation being watched; `None` while idle.
    pub name: Option<String>,
    pub status: OperationStatus,
    /// Last operation fetched for `name`.
    pub operation: Option<Operation>,
    /// Failure message once `status` is `Error`.
    pub error: Option<String>,
    /// Poll results applied since the last `watch`.
    pub polls: u32,
    generation: u64,
}

impl TrackerSnapshot {
    fn idle(generation: u64) -> Self {
        Self {
            name: None,
            status: OperationStatus::Idle,
            operation: None,
            error: None,
            polls: 0,
            generation,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == OperationStatus::Pending
    }
}

pub struct OperationTracker {
    source: Arc<dyn OperationSource>,
    interval: Duration,
    max_polls: u32,
    state: Arc<watch::Sender<TrackerSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl OperationTracker {
    pub fn new(source: Arc<dyn OperationSource>) -> Self {
        Self::with_interval(source, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(source: Arc<dyn OperationSource>, interval: Duration) -> Self {
        let (state, _) = watch::channel(TrackerSnapshot::idle(0));
        Self {
            source,
            interval,
            max_polls: DEFAULT_MAX_POLLS,
            state: Arc::new(state),
            task: None,
        }
    }

    /// Give up after `max_polls` results that are still not done.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }

    /// Start watching `name`, replacing whatever was watched before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.abort_task();

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.name = Some(name.clone());
            s.status = OperationStatus::Pending;
            s.operation = None;
            s.error = None;
            s.polls = 0;
        });

        tracing::debug!(operation = %name, "Tracking operation");

        self.task = Some(tokio::spawn(poll_loop(
            self.source.clone(),
            self.state.clone(),
            name,
            generation,
            self.interval,
            self.max_polls,
        )));
    }

    /// Stop polling and return to `Idle`. Calling it again is a no-op.
    pub fn stop(&mut self) {
        self.abort_task();
        self.state.send_if_modified(|s| {
            let changed = s.status != OperationStatus::Idle || s.name.is_some();
            *s = TrackerSnapshot::idle(s.generation + 1);
            changed
        });
    }

    /// Point the tracker at `name`, or stop it with `None`.
    ///
    /// Re-setting the name that is already being polled keeps the running
    /// loop instead of restarting it.
    pub fn set(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                let already_polling =
                    self.is_polling() && self.state.borrow().name.as_deref() == Some(name);
                if !already_polling {
                    self.watch(name);
                }
            }
            None => self.stop(),
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.state.subscribe()
    }

    /// Whether a polling loop is currently running.
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait until the tracker leaves `Pending` and return that snapshot.
    pub async fn settled(&self) -> TrackerSnapshot {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|s| s.status != OperationStatus::Pending).await {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives in `self`; it cannot close while borrowed.
            Err(_) => self.snapshot(),
        };
        settled
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for OperationTracker {
    fn drop(&mut self) {
        self.abort_task();
    }
}

async fn poll_loop(
    source: Arc<dyn OperationSource>,
    state: Arc<watch::Sender<TrackerSnapshot>>,
    name: String,
    generation: u64,
    interval: Duration,
    max_polls: u32,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately.
        ticker.tick().await;

        let result = source.get_operation(&name).await;
        if apply_poll(&state, generation, max_polls, result) {
            break;
        }
    }
}

/// Fold one poll result into the state. Returns true when the loop should end.
fn apply_poll(
    state: &watch::Sender<TrackerSnapshot>,
    generation: u64,
    max_polls: u32,
    result: Result<Operation, ApiError>,
) -> bool {
    let mut finished = true;

    state.send_if_modified(|s| {
        if s.generation != generation {
            record_operation_poll("discarded");
            return false;
        }

        s.polls += 1;
        match result {
            Ok(operation) => {
                if operation.done {
                    match operation.failure_message() {
                        Some(message) => {
                            tracing::warn!(
                                operation = %operation.name,
                                error = %message,
                                "Operation finished with an error"
                            );
                            record_operation_poll("failed");
                            s.status = OperationStatus::Error;
                            s.error = Some(message);
                        }
                        None => {
                            tracing::info!(operation = %operation.name, "Operation completed");
                            record_operation_poll("done");
                            s.status = OperationStatus::Done;
                        }
                    }
                } else if s.polls >= max_polls {
                    tracing::warn!(
                        operation = %operation.name,
                        polls = s.polls,
                        "Operation still not done, giving up"
                    );
                    record_operation_poll("gave_up");
                    s.status = OperationStatus::Error;
                    s.error = Some(format!(
                        "Operation did not finish after {} status checks",
                        s.polls
                    ));
                } else {
                    record_operation_poll("pending");
                    finished = false;
                }
                s.operation = Some(operation);
            }
            Err(e) => {
                tracing::warn!(
                    operation = ?s.name,
                    error = %e,
                    "Operation poll failed, giving up"
                );
                record_operation_poll("fetch_error");
                s.status = OperationStatus::Error;
                s.error = Some(e.to_string());
            }
        }
        true
    });

    finished
}
