//! Logging handler delivering records to a chat webhook.
//!
//! [`FemtoWebhookHandler`] adapts the [`webhook`](crate::webhook) delivery
//! pipeline to [`FemtoHandlerTrait`](crate::handler::FemtoHandlerTrait):
//! records are filtered by level, formatted, tagged with a severity token
//! from a [`TokenMap`] and queued for the worker thread. Failures the worker
//! encounters are reported through an [`ErrorRouter`] to a configurable
//! error-sink logger, guarding against sinks that would feed the failure
//! back into the same handler.

mod config;
mod error_sink;
mod handler;
mod tokens;


pub use config::WebhookHandlerConfig;
pub use error_sink::{ErrorRouter, ErrorSinkError};
pub use handler::{FemtoWebhookHandler, WebhookHandlerError};
pub use tokens::TokenMap;
