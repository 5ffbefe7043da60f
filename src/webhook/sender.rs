//! Producer-facing half of the delivery pipeline.

use std::fmt;
use std::io;
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use log::warn;
use parking_lot::Mutex;
use thiserror::Error;

use super::config::SenderConfig;
use super::endpoint::EndpointError;
use super::queue::{PendingTasks, QueueEntry, SendItem};
use super::transport::WebhookTransport;
use super::worker::{ErrorCallback, Worker, report};

/// Failures while constructing a [`WebhookSender`].
#[derive(Debug, Error)]
pub enum SenderError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("failed to spawn webhook worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Queues messages and delivers them from a dedicated worker thread.
///
/// `send` never blocks on the network and never returns delivery failures;
/// those go to the error callback along with the item's correlation data.
/// Messages are delivered one at a time in the order they were queued.
pub struct WebhookSender<T: Send + 'static> {
    name: String,
    capacity: Option<usize>,
    default_token: Option<String>,
    channel: Option<String>,
    tx: Sender<QueueEntry<T>>,
    tasks: Arc<PendingTasks>,
    on_error: ErrorCallback<T>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> WebhookSender<T> {
    /// Build the transport and start the worker thread.
    pub fn with_config(config: SenderConfig, on_error: ErrorCallback<T>) -> Result<Self, SenderError> {
        Self::spawn(config, on_error, None)
    }

    /// Like [`with_config`](Self::with_config), but the worker waits on
    /// `barrier` before taking its first entry.
    #[cfg(any(test, feature = "test-util"))]
    pub fn with_start_barrier(
        config: SenderConfig,
        on_error: ErrorCallback<T>,
        barrier: Arc<Barrier>,
    ) -> Result<Self, SenderError> {
        Self::spawn(config, on_error, Some(barrier))
    }

    fn spawn(
        config: SenderConfig,
        on_error: ErrorCallback<T>,
        start_barrier: Option<Arc<Barrier>>,
    ) -> Result<Self, SenderError> {
        let capacity = config.capacity();
        let SenderConfig {
            transport,
            name,
            default_token,
            ..
        } = config;
        let transport = WebhookTransport::new(transport)?;
        let channel = transport.channel().map(str::to_owned);
        let (tx, rx): (Sender<QueueEntry<T>>, Receiver<QueueEntry<T>>) = match capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let tasks = Arc::new(PendingTasks::new());
        let worker = Worker::new(rx, Arc::clone(&tasks), transport, Arc::clone(&on_error));
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            if let Some(barrier) = start_barrier {
                barrier.wait();
            }
            worker.run();
        })?;
        Ok(Self {
            name,
            capacity,
            default_token,
            channel,
            tx,
            tasks,
            on_error,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue `message` for delivery.
    ///
    /// A `None` token falls back to the configured default. When the queue
    /// is full, or the worker has stopped, the message is dropped and the
    /// error callback is invoked with `data`.
    pub fn send(&self, message: impl Into<String>, token: Option<String>, data: Option<T>) {
        let token = token.or_else(|| self.default_token.clone());
        let item = SendItem::new(message, token, data);
        self.tasks.add();
        match self.tx.try_send(QueueEntry::Item(item)) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                self.tasks.retract();
                let message = format!(
                    "Message queue of '{}' full. Consider to increase the queue_size passed to WebhookSender.",
                    self.name
                );
                self.report_dropped(entry, &message);
            }
            Err(TrySendError::Disconnected(entry)) => {
                self.tasks.retract();
                let message = format!("Message queue of '{}' is closed; message dropped.", self.name);
                self.report_dropped(entry, &message);
            }
        }
    }

    fn report_dropped(&self, entry: QueueEntry<T>, message: &str) {
        let data = match &entry {
            QueueEntry::Item(item) => item.data.as_ref(),
            QueueEntry::Sentinel => None,
        };
        report(&self.on_error, data, message);
    }

    /// Stop the worker after everything queued so far and wait for it.
    ///
    /// Calling this again, or after the worker has exited, does nothing.
    /// Concurrent callers all return only once the worker thread is gone.
    pub fn shutdown(&self) {
        let mut slot = self.handle.lock();
        let Some(handle) = slot.take() else {
            return;
        };
        self.tasks.add();
        if self.tx.send(QueueEntry::Sentinel).is_err() {
            self.tasks.retract();
        }
        if handle.join().is_err() {
            warn!("WebhookSender '{}': worker thread panicked", self.name);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue capacity, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn default_token(&self) -> Option<&str> {
        self.default_token.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// `true` while the worker thread is running.
    pub fn is_alive(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// `true` when no entry is waiting in the queue.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Entries accepted but not yet fully processed.
    pub fn pending(&self) -> usize {
        self.tasks.unfinished()
    }

    /// Block until every accepted entry has been processed.
    ///
    /// Blocks forever if the worker has stopped with entries still queued.
    pub fn wait_sent(&self) {
        self.tasks.join();
    }

    /// Like [`wait_sent`](Self::wait_sent) with an upper bound. Returns
    /// `false` on timeout.
    pub fn wait_sent_timeout(&self, timeout: Duration) -> bool {
        self.tasks.join_timeout(timeout)
    }
}

impl<T: Send + 'static> Drop for WebhookSender<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Send + 'static> fmt::Debug for WebhookSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSender")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("channel", &self.channel)
            .field("pending", &self.pending())
            .finish()
    }
}
