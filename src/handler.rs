//! Handler trait shared by every log destination.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::log_record::FemtoLogRecord;

/// Errors surfaced synchronously by handler operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler has been closed and no longer accepts records.
    #[error("handler is closed")]
    Closed,
    /// The handler's error sink routed an internal failure back into the
    /// handler itself. The sink has been removed.
    #[error(
        "Handler '{handler}' called itself to handle an internal error. \
         Removing error logger. Original error: {message}"
    )]
    SelfReport { handler: String, message: String },
}

/// Stable identity of a handler instance.
///
/// Identities are process unique and never reused, so they can be compared
/// when walking logger hierarchies looking for reporting cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trait implemented by all log handlers.
///
/// Handlers are `Send + Sync` so loggers can share them across threads.
/// Implementations forward records to their own consumer thread without
/// blocking the caller.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError>;

    /// Wait for queued records to be processed. Returns `false` on timeout.
    fn flush(&self) -> bool {
        true
    }

    /// Stop accepting records and release background resources.
    fn close(&self) {}

    /// Identity used for cycle detection. Handlers which can report their
    /// own failures through a logger return `Some`.
    fn handler_id(&self) -> Option<HandlerId> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}
