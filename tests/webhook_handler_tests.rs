//! End-to-end tests wiring loggers, the webhook handler and an error sink.

use std::sync::Arc;
use std::time::Duration;

extern crate femtologging_webhook as _femtologging_webhook;

use _femtologging_webhook::{
    FemtoHandlerTrait, FemtoLevel, FemtoLogRecord, FemtoLogger, HandlerBuildError, HandlerBuilderTrait,
    MessageOnlyFormatter, ProxyEnvironment, SharedFormatter, WebhookHandlerBuilder, get_logger,
    reset_manager, root_logger,
};
use rstest::rstest;

mod test_utils;
use test_utils::{refused_url, spawn_webhook_server};

fn builder(url: String) -> WebhookHandlerBuilder {
    WebhookHandlerBuilder::new()
        .with_url(url)
        .with_proxy_env(ProxyEnvironment::empty())
        .with_timeout_ms(5_000)
        .with_token(FemtoLevel::Trace, "notset")
        .with_token(FemtoLevel::Error, "error")
        .with_token(FemtoLevel::Critical, "critical")
}

#[rstest]
fn hierarchy_delivers_to_webhook() {
    reset_manager();
    let (addr, rx) = spawn_webhook_server(vec![200, 200]);
    let handler = Arc::new(
        builder(format!("http://{addr}/hooks/team"))
            .with_channel("ops")
            .with_level(FemtoLevel::Warn)
            .build_inner()
            .expect("handler"),
    );
    let app = get_logger("app").expect("logger");
    assert!(Arc::ptr_eq(app.parent().expect("parent"), &root_logger()));
    app.add_handler(handler.clone());

    let db = get_logger("app.db").expect("logger");
    db.log(FemtoLevel::Info, "below handler level");
    db.log(FemtoLevel::Error, "connection lost");
    db.log(FemtoLevel::Critical, "pool exhausted");
    assert!(handler.flush());

    let first = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let second = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(first.path, "/hooks/team");
    let first = first.json();
    let second = second.json();
    assert_eq!(first["text"], "app.db [ERROR] connection lost");
    assert_eq!(first["icon_emoji"], "error");
    assert_eq!(first["channel"], "ops");
    assert_eq!(second["text"], "app.db [CRITICAL] pool exhausted");
    assert_eq!(second["icon_emoji"], "critical");

    app.clear_handlers();
    reset_manager();
}

#[rstest]
fn failures_reach_error_sink_handlers() {
    let (addr, rx) = spawn_webhook_server(vec![200]);
    let alerts = Arc::new(
        builder(format!("http://{addr}/hooks/alerts"))
            .with_name("alerts")
            .with_formatter(SharedFormatter::new(MessageOnlyFormatter))
            .build_inner()
            .expect("alerts handler"),
    );
    let sink = Arc::new(FemtoLogger::new("webhook.errors"));
    sink.set_propagate(false);
    sink.add_handler(alerts.clone());

    let broken = builder(refused_url())
        .with_name("broken")
        .with_error_sink(Arc::clone(&sink))
        .build_inner()
        .expect("broken handler");

    broken
        .handle(FemtoLogRecord::new(
            "svc",
            FemtoLevel::Error,
            "payment failed",
        ))
        .expect("queued");
    assert!(broken.flush());
    assert!(alerts.flush());

    let body = rx.recv_timeout(Duration::from_secs(5)).expect("request").json();
    let text = body["text"].as_str().expect("text");
    assert!(text.starts_with(
        "Error while sending message \"svc [ERROR] payment failed\" with emoji 'error': "
    ));
    assert!(text.contains("\nRecord: <FemtoLogRecord: svc, ERROR"));
    assert_eq!(body["icon_emoji"], "error");

    sink.clear_handlers();
}

#[rstest]
fn error_sink_through_ancestor_is_a_cycle() {
    let handler = Arc::new(
        builder(refused_url())
            .with_name("self-reporting")
            .build_inner()
            .expect("handler"),
    );
    let parent = Arc::new(FemtoLogger::new("parent"));
    let child = Arc::new(FemtoLogger::with_parent("parent.errors", Some(Arc::clone(&parent))));
    parent.add_handler(handler.clone());

    let err = handler
        .set_error_sink(Some(Arc::clone(&child)))
        .expect_err("cycle through parent");
    assert!(err.to_string().contains("'parent.errors'"));
    assert!(err.to_string().contains("'self-reporting'"));

    child.set_propagate(false);
    handler
        .set_error_sink(Some(child))
        .expect("non-propagating logger no longer reaches the handler");

    parent.clear_handlers();
}

#[rstest]
fn build_rejects_bad_url() {
    let err = WebhookHandlerBuilder::new()
        .with_url("mailto:ops@example.com")
        .build()
        .err()
        .expect("invalid scheme");
    assert!(matches!(err, HandlerBuildError::Endpoint(_)));
}
