//! Log record representation for the femtologging framework.
//!
//! This module defines the `FemtoLogRecord` struct that captures log events
//! along with their contextual metadata such as timestamps and thread
//! information. Webhook handlers carry records through their delivery queue
//! so failures can be reported with the originating context.

use crate::level::FemtoLevel;
use chrono::{DateTime, Local};
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let current = thread::current();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp: SystemTime::now(),
            thread_id: current.id(),
            thread_name: current.name().map(ToString::to_string),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FemtoLogRecord {
    logger: String,
    level: FemtoLevel,
    message: String,
    metadata: RecordMetadata,
}

impl FemtoLogRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: FemtoLevel, message: &str) -> Self {
        Self::with_metadata(logger, level, message, RecordMetadata::default())
    }

    /// Construct a log record with explicit source location.
    pub fn with_metadata(
        logger: &str,
        level: FemtoLevel,
        message: &str,
        metadata: RecordMetadata,
    ) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn level_str(&self) -> &'static str {
        self.level.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}

/// Short single-line representation used when reporting delivery failures.
impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created: DateTime<Local> = self.metadata.timestamp.into();
        write!(
            f,
            "<FemtoLogRecord: {}, {}, {}:{}, {:?} at {}>",
            self.logger,
            self.level,
            self.metadata.filename,
            self.metadata.line_number,
            self.message,
            created.format("%Y-%m-%d %H:%M:%S%.3f"),
        )
    }
}
