//! Core logger implementation.
//!
//! A [`FemtoLogger`] owns a list of handlers, a minimum level, and an
//! optional parent. Records pass the level gate, reach every local handler,
//! and then propagate to the parent while `propagate` is set, mirroring the
//! dotted hierarchy maintained by [`crate::manager`].
//!
//! Dispatch is synchronous: each handler owns its worker thread, so the
//! logger never blocks on I/O itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use log::warn;
use parking_lot::RwLock;

use crate::formatter::{DefaultFormatter, SharedFormatter};
use crate::handler::{FemtoHandlerTrait, HandlerId};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

pub struct FemtoLogger {
    /// Identifier used to distinguish log messages from different loggers.
    name: String,
    parent: Option<Arc<FemtoLogger>>,
    formatter: SharedFormatter,
    level: AtomicU8,
    propagate: AtomicBool,
    handlers: RwLock<Vec<Arc<dyn FemtoHandlerTrait>>>,
}

impl FemtoLogger {
    /// Create a root-less logger with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parent(name, None)
    }

    /// Create a logger with an explicit parent.
    pub fn with_parent(name: impl Into<String>, parent: Option<Arc<FemtoLogger>>) -> Self {
        Self {
            name: name.into(),
            parent,
            formatter: SharedFormatter::new(DefaultFormatter),
            level: AtomicU8::new(FemtoLevel::Info.severity()),
            propagate: AtomicBool::new(true),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<FemtoLogger>> {
        self.parent.as_ref()
    }

    /// Format a message at the provided level and dispatch it.
    ///
    /// Returns the formatted message when the record passed the level check,
    /// otherwise `None`.
    pub fn log(&self, level: FemtoLevel, message: &str) -> Option<String> {
        self.log_record(FemtoLogRecord::new(&self.name, level, message))
    }

    /// Dispatch an already-constructed record through this logger.
    pub fn log_record(&self, record: FemtoLogRecord) -> Option<String> {
        if !self.is_enabled_for(record.level()) {
            return None;
        }
        let msg = self.formatter.format(&record);
        self.dispatch(&record);
        Some(msg)
    }

    /// Return whether `level` is enabled for this logger.
    pub fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        level.severity() >= self.level.load(Ordering::Relaxed)
    }

    /// Update the logger's minimum level.
    pub fn set_level(&self, level: FemtoLevel) {
        self.level.store(level.severity(), Ordering::Relaxed);
    }

    /// Return the logger's current minimum level.
    pub fn level(&self) -> FemtoLevel {
        let stored = self.level.load(Ordering::Relaxed);
        FemtoLevel::ALL
            .into_iter()
            .find(|l| l.severity() >= stored)
            .unwrap_or(FemtoLevel::Critical)
    }

    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::SeqCst)
    }

    pub fn set_propagate(&self, flag: bool) {
        self.propagate.store(flag, Ordering::SeqCst);
    }

    /// Attach a handler to this logger.
    pub fn add_handler(&self, handler: Arc<dyn FemtoHandlerTrait>) {
        self.handlers.write().push(handler);
    }

    /// Detach a handler previously added to this logger.
    pub fn remove_handler(&self, handler: &Arc<dyn FemtoHandlerTrait>) -> bool {
        let mut handlers = self.handlers.write();
        if let Some(pos) = handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            handlers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove all handlers from this logger.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Snapshot of the handlers attached directly to this logger.
    pub fn handlers(&self) -> Vec<Arc<dyn FemtoHandlerTrait>> {
        self.handlers.read().clone()
    }

    /// Return `true` if a handler with identity `id` is attached here.
    pub fn has_handler(&self, id: HandlerId) -> bool {
        self.handlers
            .read()
            .iter()
            .any(|h| h.handler_id() == Some(id))
    }

    /// Iterate over this logger and the ancestors a record would reach.
    ///
    /// The walk stops after the first logger whose `propagate` flag is off,
    /// because records logged there never travel further up.
    pub fn propagation_chain(&self) -> PropagationChain<'_> {
        PropagationChain {
            next: Some(self),
        }
    }

    /// Flush every handler reachable from this logger.
    pub fn flush_handlers(&self) -> bool {
        self.propagation_chain()
            .flat_map(|logger| logger.handlers())
            .fold(true, |ok, h| h.flush() && ok)
    }

    fn dispatch(&self, record: &FemtoLogRecord) {
        for logger in self.propagation_chain() {
            for handler in logger.handlers() {
                if let Err(err) = handler.handle(record.clone()) {
                    warn!("FemtoLogger: handler reported an error: {err}");
                }
            }
        }
    }
}

impl std::fmt::Debug for FemtoLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoLogger")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("level", &self.level())
            .field("propagate", &self.propagate())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

/// Iterator returned by [`FemtoLogger::propagation_chain`].
pub struct PropagationChain<'a> {
    next: Option<&'a FemtoLogger>,
}

impl<'a> Iterator for PropagationChain<'a> {
    type Item = &'a FemtoLogger;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current.propagate() {
            self.next = current.parent.as_deref();
        }
        Some(current)
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod logger_tests;
