//! Global registry mapping logger names to instances.
//!
//! Names form a dotted hierarchy rooted at `"root"`. Requesting a logger
//! creates any missing ancestors so that every logger's parent pointer is
//! fixed at construction time.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

use crate::logger::FemtoLogger;

/// Name of the logger at the top of every hierarchy.
pub const ROOT_LOGGER: &str = "root";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid logger name: {0:?}")]
pub struct InvalidLoggerName(pub String);

#[derive(Default)]
struct Manager {
    loggers: HashMap<String, Arc<FemtoLogger>>,
}

impl Manager {
    fn get_or_create(&mut self, name: &str) -> Arc<FemtoLogger> {
        if let Some(existing) = self.loggers.get(name) {
            return existing.clone();
        }
        let parent = if name == ROOT_LOGGER {
            None
        } else {
            let parent_name = name.rsplit_once('.').map_or(ROOT_LOGGER, |(p, _)| p);
            Some(self.get_or_create(parent_name))
        };
        let logger = Arc::new(FemtoLogger::with_parent(name, parent));
        self.loggers.insert(name.to_owned(), logger.clone());
        logger
    }
}

static MANAGER: Lazy<RwLock<Manager>> = Lazy::new(|| RwLock::new(Manager::default()));

/// Retrieve an existing logger or create one with a dotted-name parent.
pub fn get_logger(name: &str) -> Result<Arc<FemtoLogger>, InvalidLoggerName> {
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(InvalidLoggerName(name.to_owned()));
    }
    if let Some(existing) = MANAGER.read().loggers.get(name) {
        return Ok(existing.clone());
    }
    Ok(MANAGER.write().get_or_create(name))
}

/// Return the root logger.
pub fn root_logger() -> Arc<FemtoLogger> {
    MANAGER.write().get_or_create(ROOT_LOGGER)
}

/// Forget every registered logger. Existing `Arc`s stay valid.
pub fn reset_manager() {
    MANAGER.write().loggers.clear();
}
