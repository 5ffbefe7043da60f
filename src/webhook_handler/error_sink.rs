//! Routing of delivery failures back into the logging framework.
//!
//! A webhook handler may name a logger as its error sink. Failures are then
//! logged there at `Error` level; without a sink they are written to a
//! fallback writer (standard error unless replaced). A sink that would
//! deliver back into the reporting handler, either directly or through a
//! propagating ancestor, forms a cycle and is refused when set. A sink that
//! becomes cyclic later is dropped at the first report that notices it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use log::warn;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::handler::{HandlerError, HandlerId};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::logger::FemtoLogger;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorSinkError {
    #[error(
        "Attempted to set logger '{sink}' as error logger for handler '{handler}', \
         but that logger contains the handler creating a cycle."
    )]
    Cycle { sink: String, handler: String },
}

/// Error sink state shared between a handler and its worker callback.
pub struct ErrorRouter {
    id: HandlerId,
    name: String,
    sink: RwLock<Option<Arc<FemtoLogger>>>,
    fallback: Mutex<Box<dyn Write + Send>>,
}

impl ErrorRouter {
    /// Router for the handler identified by `id`, falling back to stderr.
    pub fn new(id: HandlerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sink: RwLock::new(None),
            fallback: Mutex::new(Box::new(io::stderr())),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the fallback writer used when no sink is configured.
    pub fn set_fallback<W: Write + Send + 'static>(&self, writer: W) {
        *self.fallback.lock() = Box::new(writer);
    }

    /// `true` if a record logged on `logger` would reach this handler.
    pub fn is_reachable_from(&self, logger: &FemtoLogger) -> bool {
        logger
            .propagation_chain()
            .any(|level| level.has_handler(self.id))
    }

    pub fn error_sink(&self) -> Option<Arc<FemtoLogger>> {
        self.sink.read().clone()
    }

    /// Set or, with `None`, clear the error sink.
    ///
    /// # Errors
    ///
    /// [`ErrorSinkError::Cycle`] when `sink` already reaches this handler.
    /// The previous sink is kept in that case.
    pub fn set_error_sink(&self, sink: Option<Arc<FemtoLogger>>) -> Result<(), ErrorSinkError> {
        if let Some(logger) = &sink
            && self.is_reachable_from(logger)
        {
            return Err(ErrorSinkError::Cycle {
                sink: logger.name().to_owned(),
                handler: self.name.clone(),
            });
        }
        *self.sink.write() = sink;
        Ok(())
    }

    pub fn clear_error_sink(&self) {
        self.sink.write().take();
    }

    /// Report a failure, optionally tied to the record that caused it.
    ///
    /// # Errors
    ///
    /// [`HandlerError::SelfReport`] when the configured sink has become
    /// cyclic. The sink is cleared and the failure written to the fallback
    /// before returning.
    pub fn report_error(
        &self,
        record: Option<&FemtoLogRecord>,
        message: &str,
    ) -> Result<(), HandlerError> {
        let text = match record {
            Some(record) => format!("{message}\nRecord: {record}"),
            None => message.to_owned(),
        };
        let Some(sink) = self.error_sink() else {
            self.write_fallback(&text);
            return Ok(());
        };
        if self.is_reachable_from(&sink) {
            self.drop_sink(&sink);
            self.write_fallback(&text);
            return Err(HandlerError::SelfReport {
                handler: self.name.clone(),
                message: text,
            });
        }
        sink.log(FemtoLevel::Error, &text);
        Ok(())
    }

    /// Clear the sink unless another thread already replaced it.
    fn drop_sink(&self, stale: &Arc<FemtoLogger>) {
        let mut sink = self.sink.write();
        if sink.as_ref().is_some_and(|current| Arc::ptr_eq(current, stale)) {
            sink.take();
        }
    }

    fn write_fallback(&self, text: &str) {
        let mut writer = self.fallback.lock();
        if writeln!(writer, "{text}").and_then(|_| writer.flush()).is_err() {
            warn!("ErrorRouter: failed to write to fallback for handler '{}'", self.name);
        }
    }
}

impl fmt::Debug for ErrorRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRouter")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("sink", &self.sink.read().as_ref().map(|s| s.name().to_owned()))
            .finish()
    }
}
