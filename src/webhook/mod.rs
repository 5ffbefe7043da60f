//! Delivery of chat messages to Mattermost and Slack style incoming webhooks.
//!
//! The pieces layer as follows:
//!
//! - [`WebhookTransport`] posts one JSON message per call over a connection
//!   scoped by [`WebhookTransport::session`]. Proxy selection happens once,
//!   at construction.
//! - [`WebhookSender`] owns a queue and a named worker thread. `send` only
//!   enqueues; the worker drains everything available over one connection
//!   and hands failures to an [`ErrorCallback`] together with the caller's
//!   correlation data.
//!
//! # Queue Semantics
//!
//! - A `queue_size` of zero gives an unbounded queue.
//! - When a bounded queue is full the message is dropped and reported
//!   through the callback; `send` never blocks.
//! - Shutdown enqueues a sentinel and joins the worker, so everything queued
//!   before it is still attempted.

mod config;
mod endpoint;
mod payload;
mod proxy;
mod queue;
mod sender;
mod transport;
mod worker;


pub use config::{
    DEFAULT_QUEUE_SIZE, DEFAULT_SENDER_NAME, DEFAULT_TIMEOUT, SenderConfig, TransportConfig,
};
pub use endpoint::{EndpointError, Scheme, WebhookEndpoint};
pub use payload::WebhookPayload;
pub use proxy::{ProxyDecision, ProxyEnvironment, is_excluded, resolve_proxy};
pub use queue::{PendingTasks, QueueEntry, QueueError, SendItem};
pub use sender::{SenderError, WebhookSender};
pub use transport::{ConnectionGuard, TransportError, WebhookTransport};
pub use worker::{ErrorCallback, default_error_callback};
