//! Blocking webhook client.
//!
//! [`WebhookTransport`] posts one message per call. A connected transport
//! holds a `ureq::Agent`, whose pool keeps the TCP/TLS connection to the
//! webhook host alive between sends. The transport is owned by exactly one
//! thread; every state change takes `&mut self`.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use thiserror::Error;
use ureq::{Agent, AgentBuilder, Proxy};

use super::config::TransportConfig;
use super::endpoint::{EndpointError, WebhookEndpoint};
use super::payload::WebhookPayload;
use super::proxy::{ProxyDecision, ProxyEnvironment, resolve_proxy};

/// Failures raised by [`WebhookTransport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// `send` was called without an open connection. This is a programming
    /// error rather than a delivery failure.
    #[error("webhook transport is not connected")]
    NotConnected,
    /// The webhook answered with a non-2xx status.
    #[error("webhook replied with HTTP status {status} ({reason})")]
    Status { status: u16, reason: String },
    /// DNS, TLS, connection or timeout failure.
    #[error("sending the message raised a transport error: {0}")]
    Transport(String),
    #[error("failed to serialise webhook payload: {0}")]
    Serialise(String),
    #[error("failed to initialise TLS: {0}")]
    Tls(String),
}

impl TransportError {
    /// `true` for failures that happened while delivering a message, as
    /// opposed to misuse of the transport.
    pub fn is_delivery_failure(&self) -> bool {
        !matches!(self, Self::NotConnected)
    }
}

/// Synchronous client for one webhook endpoint.
pub struct WebhookTransport {
    endpoint: WebhookEndpoint,
    proxy: ProxyDecision,
    /// Parsed form of `proxy`, checked once at construction.
    proxy_server: Option<Proxy>,
    timeout: Duration,
    agent: Option<Agent>,
}

impl WebhookTransport {
    /// Parse the endpoint and resolve the proxy decision.
    ///
    /// The process environment is read here, once, when the configuration
    /// does not carry its own [`ProxyEnvironment`].
    ///
    /// # Errors
    ///
    /// [`EndpointError::InvalidProxy`] when the resolved proxy is not one the
    /// client can connect through. Only `http://` and SOCKS proxies are
    /// supported.
    pub fn new(config: TransportConfig) -> Result<Self, EndpointError> {
        let endpoint = WebhookEndpoint::parse(&config.url, config.channel)?;
        let env = config.proxy_env.unwrap_or_else(ProxyEnvironment::capture);
        let proxy = resolve_proxy(&endpoint, config.proxy.as_deref(), &env);
        let proxy_server = proxy
            .proxy_url()
            .map(|url| {
                Proxy::new(url).map_err(|err| EndpointError::InvalidProxy {
                    proxy: url.to_owned(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            endpoint,
            proxy,
            proxy_server,
            timeout: config.timeout,
            agent: None,
        })
    }

    pub fn endpoint(&self) -> &WebhookEndpoint {
        &self.endpoint
    }

    pub fn proxy(&self) -> &ProxyDecision {
        &self.proxy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn channel(&self) -> Option<&str> {
        self.endpoint.channel()
    }

    pub fn is_connected(&self) -> bool {
        self.agent.is_some()
    }

    /// Open a connection handle. Calling this while connected replaces the
    /// existing handle.
    ///
    /// Redirects are not followed: a 3xx reply is a delivery failure.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        let mut builder = AgentBuilder::new().timeout(self.timeout).redirects(0);
        if let Some(proxy) = &self.proxy_server {
            builder = builder.proxy(proxy.clone());
        }
        if self.endpoint.is_https() {
            let connector =
                native_tls::TlsConnector::new().map_err(|e| TransportError::Tls(e.to_string()))?;
            builder = builder.tls_connector(Arc::new(connector));
        }
        debug!(
            "WebhookTransport: connecting to {}:{}",
            self.endpoint.host(),
            self.endpoint.port()
        );
        self.agent = Some(builder.build());
        Ok(())
    }

    /// Close the connection handle. Safe to call when not connected.
    pub fn disconnect(&mut self) {
        if self.agent.take().is_some() {
            debug!("WebhookTransport: disconnected from {}", self.endpoint.host());
        }
    }

    /// Connect and return a guard that disconnects when dropped.
    pub fn session(&mut self) -> Result<ConnectionGuard<'_>, TransportError> {
        self.connect()?;
        Ok(ConnectionGuard { transport: self })
    }

    /// Build the JSON body for `message`.
    pub fn body(&self, message: &str, token: Option<&str>) -> Result<String, TransportError> {
        WebhookPayload::new(message, token, self.endpoint.channel())
            .to_json()
            .map_err(|e| TransportError::Serialise(e.to_string()))
    }

    /// Post `message` over the open connection.
    ///
    /// # Errors
    ///
    /// [`TransportError::NotConnected`] if [`connect`](Self::connect) has not
    /// been called; any other variant describes a delivery failure.
    pub fn send(&self, message: &str, token: Option<&str>) -> Result<(), TransportError> {
        let agent = self.agent.as_ref().ok_or(TransportError::NotConnected)?;
        let body = self.body(message, token)?;
        let result = agent
            .post(self.endpoint.url())
            .set("Content-Type", "application/json")
            .send_string(&body);
        match result {
            Ok(response) => {
                let status = response.status();
                let reason = response.status_text().to_owned();
                // Reading the body to the end returns the connection to the pool.
                let _ = response.into_string();
                classify_status(status, reason)
            }
            Err(ureq::Error::Status(status, response)) => Err(TransportError::Status {
                status,
                reason: response.status_text().to_owned(),
            }),
            Err(ureq::Error::Transport(err)) => Err(TransportError::Transport(err.to_string())),
        }
    }

    /// Post `message`, opening a temporary connection if none is open.
    pub fn send_once(&mut self, message: &str, token: Option<&str>) -> Result<(), TransportError> {
        if self.is_connected() {
            return self.send(message, token);
        }
        self.session()?.send(message, token)
    }
}

impl std::fmt::Debug for WebhookTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookTransport")
            .field("endpoint", &self.endpoint)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Scoped connection returned by [`WebhookTransport::session`].
///
/// The transport is disconnected when the guard goes out of scope, on
/// every exit path including unwinding.
pub struct ConnectionGuard<'a> {
    transport: &'a mut WebhookTransport,
}

impl Deref for ConnectionGuard<'_> {
    type Target = WebhookTransport;

    fn deref(&self) -> &Self::Target {
        self.transport
    }
}

impl DerefMut for ConnectionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.transport
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.transport.disconnect();
    }
}

/// Map a final response status to the send outcome.
pub(crate) fn classify_status(status: u16, reason: String) -> Result<(), TransportError> {
    match status {
        200..=299 => Ok(()),
        _ => Err(TransportError::Status { status, reason }),
    }
}
