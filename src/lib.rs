//! Chat webhook delivery for femtologging.
//!
//! Log records are formatted, tagged with a severity token and posted to a
//! Mattermost or Slack style incoming webhook from a background worker.
//! Delivery failures are reported through a configurable error-sink logger,
//! with protection against sinks that would route failures back into the
//! reporting handler.

pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod log_record;
pub mod logger;
pub mod manager;
pub mod stream_handler;
pub mod webhook;
pub mod webhook_handler;

#[cfg(test)]
mod test_utils;

pub use formatter::{DefaultFormatter, FemtoFormatter, MessageOnlyFormatter, SharedFormatter};
pub use handler::{FemtoHandlerTrait, HandlerError, HandlerId};
pub use handlers::{HandlerBuildError, HandlerBuilderTrait, WebhookHandlerBuilder, WebhookSettings};
pub use level::FemtoLevel;
pub use log_record::{FemtoLogRecord, RecordMetadata};
pub use logger::FemtoLogger;
pub use manager::{get_logger, reset_manager, root_logger};
pub use stream_handler::FemtoStreamHandler;
pub use webhook::{
    ErrorCallback, ProxyDecision, ProxyEnvironment, SenderConfig, TransportConfig, WebhookSender,
    WebhookTransport,
};
pub use webhook_handler::{ErrorRouter, ErrorSinkError, FemtoWebhookHandler, TokenMap};
