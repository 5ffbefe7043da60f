//! Formatter implementations used by handlers.
//!
//! Provides the core [`FemtoFormatter`] trait alongside [`SharedFormatter`],
//! a cheaply clonable trait object handlers keep for the lifetime of their
//! worker.

use std::{fmt, sync::Arc};

use crate::log_record::FemtoLogRecord;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &FemtoLogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn FemtoFormatter + Send + Sync>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: FemtoFormatter + Send + Sync + 'static,
    {
        let inner: Arc<dyn FemtoFormatter + Send + Sync> = Arc::new(formatter);
        Self { inner }
    }

    /// Build a formatter from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&FemtoLogRecord) -> String + Send + Sync + 'static,
    {
        Self::new(FnFormatter(f))
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn FemtoFormatter>)")
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        format!(
            "{} [{}] {}",
            record.logger(),
            record.level_str(),
            record.message()
        )
    }
}

/// Formatter emitting only the record message, for chat destinations where
/// the logger name and level are conveyed by other means.
#[derive(Copy, Clone, Debug, Default)]
pub struct MessageOnlyFormatter;

impl FemtoFormatter for MessageOnlyFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        record.message().to_owned()
    }
}

/// Adapter turning a closure into a [`FemtoFormatter`].
pub struct FnFormatter<F>(pub F);

impl<F> FemtoFormatter for FnFormatter<F>
where
    F: Fn(&FemtoLogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &FemtoLogRecord) -> String {
        (self.0)(record)
    }
}
