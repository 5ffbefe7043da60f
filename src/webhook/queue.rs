//! Queue entries and acknowledgment accounting for the delivery worker.
//!
//! The channel itself carries [`QueueEntry`] values. [`PendingTasks`] counts
//! entries that have been accepted but not yet acknowledged so callers can
//! block until the worker has caught up, independently of the channel's
//! flow control.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// One message waiting for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendItem<T> {
    pub message: String,
    pub token: Option<String>,
    /// Caller data handed back untouched to the error callback.
    pub data: Option<T>,
}

impl<T> SendItem<T> {
    pub fn new(message: impl Into<String>, token: Option<String>, data: Option<T>) -> Self {
        Self {
            message: message.into(),
            token,
            data,
        }
    }
}

/// Entry read by the worker thread.
#[derive(Debug)]
pub enum QueueEntry<T> {
    Item(SendItem<T>),
    /// Tells the worker to stop after everything queued before it.
    Sentinel,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("task_done() called more times than entries were taken from the queue")]
    TooManyAcknowledgements,
}

/// Counter of accepted but unacknowledged queue entries.
#[derive(Debug, Default)]
pub struct PendingTasks {
    unfinished: Mutex<usize>,
    all_done: Condvar,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an entry was accepted by the queue.
    pub fn add(&self) {
        *self.unfinished.lock() += 1;
    }

    /// Undo [`add`](Self::add) for an entry the queue refused.
    pub(crate) fn retract(&self) {
        let _ = self.task_done();
    }

    /// Acknowledge one processed entry.
    ///
    /// # Errors
    ///
    /// [`QueueError::TooManyAcknowledgements`] when no entry is outstanding.
    /// The counter is left untouched in that case.
    pub fn task_done(&self) -> Result<(), QueueError> {
        let mut unfinished = self.unfinished.lock();
        if *unfinished == 0 {
            return Err(QueueError::TooManyAcknowledgements);
        }
        *unfinished -= 1;
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
        Ok(())
    }

    /// Number of entries still awaiting acknowledgment.
    pub fn unfinished(&self) -> usize {
        *self.unfinished.lock()
    }

    /// Block until every accepted entry has been acknowledged.
    pub fn join(&self) {
        let mut unfinished = self.unfinished.lock();
        while *unfinished > 0 {
            self.all_done.wait(&mut unfinished);
        }
    }

    /// Like [`join`](Self::join) but gives up after `timeout`.
    ///
    /// Returns `true` when the counter reached zero in time.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut unfinished = self.unfinished.lock();
        while *unfinished > 0 {
            if self
                .all_done
                .wait_until(&mut unfinished, deadline)
                .timed_out()
            {
                return *unfinished == 0;
            }
        }
        true
    }
}
