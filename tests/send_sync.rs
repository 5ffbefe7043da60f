//! Send/Sync guarantees for core types.

extern crate femtologging_webhook as _femtologging_webhook;

use _femtologging_webhook::{
    ErrorRouter, FemtoLogRecord, FemtoLogger, FemtoStreamHandler, FemtoWebhookHandler,
    SharedFormatter, TokenMap, WebhookHandlerBuilder, WebhookSender,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(WebhookHandlerBuilder: Send, Sync);
    assert_impl_all!(SharedFormatter: Send, Sync);
    assert_impl_all!(TokenMap: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(FemtoStreamHandler: Send, Sync);
    assert_impl_all!(FemtoLogger: Send, Sync);
    assert_impl_all!(FemtoWebhookHandler: Send, Sync);
    assert_impl_all!(ErrorRouter: Send, Sync);
    assert_impl_all!(WebhookSender<FemtoLogRecord>: Send, Sync);
}
