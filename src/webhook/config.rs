//! Configuration structures consumed by the webhook transport and sender.
//!
//! `WebhookHandlerBuilder` constructs these values before passing them to
//! [`WebhookSender`](super::WebhookSender) for runtime use.

use std::time::Duration;

use super::proxy::ProxyEnvironment;

/// Default timeout applied to a single webhook request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default queue size. Zero means the queue is unbounded.
pub const DEFAULT_QUEUE_SIZE: usize = 0;
/// Default name of the sender and its worker thread.
pub const DEFAULT_SENDER_NAME: &str = "webhook-sender";

/// Everything a [`WebhookTransport`](super::WebhookTransport) needs.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Incoming webhook URL.
    pub url: String,
    /// Channel override sent with every message.
    pub channel: Option<String>,
    /// Explicit proxy. Takes precedence over the environment.
    pub proxy: Option<String>,
    /// Timeout for one request, including connect.
    pub timeout: Duration,
    /// Proxy variables to consult. `None` captures the process environment
    /// when the transport is constructed.
    pub proxy_env: Option<ProxyEnvironment>,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            channel: None,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            proxy_env: None,
        }
    }
}

/// Configuration of a [`WebhookSender`](super::WebhookSender).
#[derive(Clone, Debug)]
pub struct SenderConfig {
    pub transport: TransportConfig,
    /// Name used for the worker thread and in queue-full reports.
    pub name: String,
    /// Maximum number of queued messages; `0` for unbounded.
    pub queue_size: usize,
    /// Token used when `send` is called without one.
    pub default_token: Option<String>,
}

impl SenderConfig {
    pub fn new(transport: TransportConfig) -> Self {
        Self {
            transport,
            ..Default::default()
        }
    }

    /// Capacity of the queue, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (self.queue_size > 0).then_some(self.queue_size)
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            name: DEFAULT_SENDER_NAME.to_owned(),
            queue_size: DEFAULT_QUEUE_SIZE,
            default_token: None,
        }
    }
}
