//! Unit tests for FemtoLogger.

use super::*;
use crate::handler::HandlerError;
use parking_lot::Mutex;
use rstest::rstest;
use std::any::Any;

#[derive(Default)]
struct CollectingHandler {
    id: Option<HandlerId>,
    records: Mutex<Vec<FemtoLogRecord>>,
}

impl CollectingHandler {
    fn with_id() -> Self {
        Self {
            id: Some(HandlerId::next()),
            ..Default::default()
        }
    }

    fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message().to_owned())
            .collect()
    }
}

impl FemtoHandlerTrait for CollectingHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn handler_id(&self) -> Option<HandlerId> {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn chain() -> (Arc<FemtoLogger>, Arc<FemtoLogger>, Arc<FemtoLogger>) {
    let root = Arc::new(FemtoLogger::new("root"));
    let parent = Arc::new(FemtoLogger::with_parent("parent", Some(root.clone())));
    let child = Arc::new(FemtoLogger::with_parent("parent.child", Some(parent.clone())));
    (root, parent, child)
}

#[rstest]
#[case("core", FemtoLevel::Info, "hello", "core [INFO] hello")]
#[case("sys", FemtoLevel::Error, "fail", "sys [ERROR] fail")]
#[case("", FemtoLevel::Info, "", " [INFO] ")]
#[case("i18n", FemtoLevel::Warn, "こんにちは世界", "i18n [WARN] こんにちは世界")]
fn log_formats_message(
    #[case] name: &str,
    #[case] level: FemtoLevel,
    #[case] message: &str,
    #[case] expected: &str,
) {
    let logger = FemtoLogger::new(name);
    assert_eq!(logger.log(level, message).as_deref(), Some(expected));
}

#[test]
fn logger_filters_levels() {
    let logger = FemtoLogger::new("core");
    logger.set_level(FemtoLevel::Error);
    assert_eq!(logger.log(FemtoLevel::Info, "ignored"), None);
    assert_eq!(logger.level(), FemtoLevel::Error);
    assert!(logger.log(FemtoLevel::Critical, "processed").is_some());
}

#[test]
fn records_propagate_to_ancestors() {
    let (root, parent, child) = chain();
    let at_root = Arc::new(CollectingHandler::default());
    let at_parent = Arc::new(CollectingHandler::default());
    root.add_handler(at_root.clone());
    parent.add_handler(at_parent.clone());

    child.log(FemtoLevel::Warn, "bubbles");

    assert_eq!(at_parent.messages(), vec!["bubbles"]);
    assert_eq!(at_root.messages(), vec!["bubbles"]);
}

#[test]
fn propagation_stops_at_non_propagating_logger() {
    let (root, parent, child) = chain();
    let at_root = Arc::new(CollectingHandler::default());
    root.add_handler(at_root.clone());
    parent.set_propagate(false);

    child.log(FemtoLevel::Warn, "contained");

    assert!(at_root.messages().is_empty());
    let names: Vec<&str> = child.propagation_chain().map(|l| l.name()).collect();
    assert_eq!(names, vec!["parent.child", "parent"]);
}

#[test]
fn has_handler_matches_identity_only() {
    let logger = FemtoLogger::new("ids");
    let tracked = Arc::new(CollectingHandler::with_id());
    let untracked = Arc::new(CollectingHandler::default());
    logger.add_handler(untracked);
    let id = tracked.handler_id().expect("id assigned");
    assert!(!logger.has_handler(id));

    let as_dyn: Arc<dyn FemtoHandlerTrait> = tracked;
    logger.add_handler(as_dyn.clone());
    assert!(logger.has_handler(id));

    assert!(logger.remove_handler(&as_dyn));
    assert!(!logger.has_handler(id));
    assert!(!logger.remove_handler(&as_dyn));
}

#[test]
fn clear_handlers_detaches_everything() {
    let logger = FemtoLogger::new("clear");
    logger.add_handler(Arc::new(CollectingHandler::default()));
    logger.add_handler(Arc::new(CollectingHandler::default()));
    logger.clear_handlers();
    assert!(logger.handlers().is_empty());
    assert!(logger.flush_handlers());
}
