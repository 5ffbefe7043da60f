//! Worker thread driving webhook I/O.
//!
//! The worker blocks on the queue, then delivers the entry it received and
//! every entry already waiting behind it over a single connection before
//! closing that connection and blocking again. Each entry taken from the
//! queue is acknowledged exactly once, whatever the outcome of its delivery.

use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use log::warn;

use super::queue::{PendingTasks, QueueEntry, SendItem};
use super::transport::{TransportError, WebhookTransport};

/// Callback receiving delivery failures together with the failed item's
/// correlation data.
pub type ErrorCallback<T> = Arc<dyn Fn(Option<&T>, &str) + Send + Sync>;

/// Callback used when none is supplied: reports through the `log` facade.
pub fn default_error_callback<T>() -> ErrorCallback<T> {
    Arc::new(|_, message| log::error!("{message}"))
}

pub(crate) struct Worker<T> {
    rx: Receiver<QueueEntry<T>>,
    tasks: Arc<PendingTasks>,
    transport: WebhookTransport,
    on_error: ErrorCallback<T>,
}

impl<T> Worker<T> {
    pub(crate) fn new(
        rx: Receiver<QueueEntry<T>>,
        tasks: Arc<PendingTasks>,
        transport: WebhookTransport,
        on_error: ErrorCallback<T>,
    ) -> Self {
        Self {
            rx,
            tasks,
            transport,
            on_error,
        }
    }

    /// Process entries until a sentinel arrives or every sender is gone.
    pub(crate) fn run(mut self) {
        while let Ok(entry) = self.rx.recv() {
            if self.send_available(entry).is_break() {
                break;
            }
        }
    }

    /// Deliver `first` plus whatever is already queued, without blocking.
    ///
    /// Returns [`ControlFlow::Break`] once a sentinel has been consumed.
    pub(crate) fn send_available(&mut self, first: QueueEntry<T>) -> ControlFlow<()> {
        let QueueEntry::Item(first) = first else {
            acknowledge(&self.tasks);
            return ControlFlow::Break(());
        };
        let Self {
            rx,
            tasks,
            transport,
            on_error,
        } = self;
        let channel = transport.channel().map(str::to_owned);
        let session = transport.session();

        let mut next = Some(first);
        let mut flow = ControlFlow::Continue(());
        while let Some(item) = next.take() {
            let outcome = match &session {
                Ok(connection) => connection.send(&item.message, item.token.as_deref()),
                Err(err) => Err(err.clone()),
            };
            if let Err(err) = outcome {
                let message = describe_failure(&item, channel.as_deref(), &err);
                report(on_error, item.data.as_ref(), &message);
            }
            acknowledge(tasks.as_ref());

            match rx.try_recv() {
                Ok(QueueEntry::Item(item)) => next = Some(item),
                Ok(QueueEntry::Sentinel) => {
                    acknowledge(tasks.as_ref());
                    flow = ControlFlow::Break(());
                }
                Err(_) => {}
            }
        }
        flow
    }
}

fn acknowledge(tasks: &PendingTasks) {
    if let Err(err) = tasks.task_done() {
        warn!("WebhookSender: {err}");
    }
}

/// Invoke `on_error`, containing any panic so the worker keeps running.
pub(crate) fn report<T>(on_error: &ErrorCallback<T>, data: Option<&T>, message: &str) {
    if panic::catch_unwind(AssertUnwindSafe(|| on_error(data, message))).is_err() {
        warn!("WebhookSender: error callback panicked while reporting: {message}");
    }
}

pub(crate) fn describe_failure<T>(
    item: &SendItem<T>,
    channel: Option<&str>,
    err: &TransportError,
) -> String {
    let mut message = format!("Error while sending message {:?}", item.message);
    if let Some(token) = &item.token {
        let _ = write!(message, " with emoji '{token}'");
    }
    if let Some(channel) = channel {
        let _ = write!(message, " to channel '{channel}'");
    }
    let _ = write!(message, ": {err}");
    message
}
