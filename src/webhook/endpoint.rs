//! Parsed webhook target.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Errors raised while deriving a [`WebhookEndpoint`] from a URL, or the
/// route to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid webhook URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported webhook URL scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
    #[error("webhook URL {0:?} has no host")]
    MissingHost(String),
    /// The proxy chosen for the endpoint cannot be used by the HTTP client.
    #[error("unusable proxy {proxy:?}: {reason}")]
    InvalidProxy { proxy: String, reason: String },
}

/// URL scheme accepted for webhook endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of where messages are posted.
///
/// Scheme and host are derived once, when the endpoint is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookEndpoint {
    url: Url,
    scheme: Scheme,
    host: String,
    port: u16,
    channel: Option<String>,
}

impl WebhookEndpoint {
    /// Parse `url` and attach an optional target channel.
    pub fn parse(url: &str, channel: Option<String>) -> Result<Self, EndpointError> {
        let parsed = Url::parse(url).map_err(|err| EndpointError::InvalidUrl {
            url: url.to_owned(),
            reason: err.to_string(),
        })?;
        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(EndpointError::UnsupportedScheme(other.to_owned())),
        };
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(url.to_owned()))?
            .to_owned();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| EndpointError::MissingHost(url.to_owned()))?;
        Ok(Self {
            url: parsed,
            scheme,
            host,
            port,
            channel,
        })
    }

    /// Full URL requests are posted to.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn is_https(&self) -> bool {
        self.scheme == Scheme::Https
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path plus query string of the webhook.
    pub fn path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{query}", self.url.path()),
            None => self.url.path().to_owned(),
        }
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }
}
