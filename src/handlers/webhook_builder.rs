//! Builder for [`FemtoWebhookHandler`](crate::webhook_handler::FemtoWebhookHandler).
//!
//! Exposes the webhook URL, channel, proxy, timeout, queue size, level,
//! severity tokens, formatter and error sink. Settings can also be loaded
//! from JSON through [`WebhookSettings`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::formatter::SharedFormatter;
use crate::level::{self, FemtoLevel};
use crate::logger::FemtoLogger;
use crate::webhook::{
    DEFAULT_SENDER_NAME, ProxyEnvironment, SenderConfig, TransportConfig, WebhookEndpoint,
};
use crate::webhook_handler::{FemtoWebhookHandler, TokenMap, WebhookHandlerConfig};

use super::{HandlerBuildError, HandlerBuilderTrait};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Serialisable webhook handler settings.
///
/// `tokens` keys are level names (`"ERROR"`, `"NOTSET"`) or numeric
/// thresholds (`"45"`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSettings {
    pub url: String,
    pub channel: Option<String>,
    pub proxy: Option<String>,
    pub timeout_ms: Option<u64>,
    pub queue_size: Option<usize>,
    pub name: Option<String>,
    pub level: Option<String>,
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    pub default_token: Option<String>,
}

/// Builder for constructing [`FemtoWebhookHandler`] instances.
#[derive(Clone, Debug, Default)]
pub struct WebhookHandlerBuilder {
    url: Option<String>,
    channel: Option<String>,
    proxy: Option<String>,
    proxy_env: Option<ProxyEnvironment>,
    timeout_ms: Option<u64>,
    queue_size: Option<usize>,
    name: Option<String>,
    level: Option<FemtoLevel>,
    tokens: TokenMap,
    default_token: Option<String>,
    formatter: Option<SharedFormatter>,
    error_sink: Option<Arc<FemtoLogger>>,
}

impl WebhookHandlerBuilder {
    /// Create a new builder with no URL configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse [`WebhookSettings`] from JSON and convert them to a builder.
    pub fn from_json(json: &str) -> Result<Self, HandlerBuildError> {
        let settings: WebhookSettings = serde_json::from_str(json).map_err(|err| {
            HandlerBuildError::InvalidConfig(format!("invalid webhook settings: {err}"))
        })?;
        Self::from_settings(settings)
    }

    /// Convert deserialised settings, validating level and token names.
    pub fn from_settings(settings: WebhookSettings) -> Result<Self, HandlerBuildError> {
        let level = settings
            .level
            .as_deref()
            .map(str::parse::<FemtoLevel>)
            .transpose()
            .map_err(|err| HandlerBuildError::InvalidConfig(err.to_string()))?;
        let mut tokens = TokenMap::new();
        for (key, token) in settings.tokens {
            tokens.insert(parse_threshold(&key)?, token);
        }
        Ok(Self {
            url: Some(settings.url),
            channel: settings.channel,
            proxy: settings.proxy,
            proxy_env: None,
            timeout_ms: settings.timeout_ms,
            queue_size: settings.queue_size,
            name: settings.name,
            level,
            tokens,
            default_token: settings.default_token,
            formatter: None,
            error_sink: None,
        })
    }

    /// Set the incoming webhook URL (required).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Post every message to `channel` instead of the webhook's default.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Use `proxy` regardless of the environment.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    option_setter!(
        #[doc = "Consult `env` instead of the process environment for proxy variables."]
        with_proxy_env,
        proxy_env,
        ProxyEnvironment
    );
    option_setter!(
        #[doc = "Set the request timeout in milliseconds."]
        with_timeout_ms,
        timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the queue size. Zero means unbounded."]
        with_queue_size,
        queue_size,
        usize
    );
    option_setter!(
        #[doc = "Set the minimum level of handled records."]
        with_level,
        level,
        FemtoLevel
    );
    option_setter!(
        #[doc = "Set the record formatter."]
        with_formatter,
        formatter,
        SharedFormatter
    );

    /// Name the handler and its worker thread.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use `token` for records at `level` and above.
    pub fn with_token(mut self, level: FemtoLevel, token: impl Into<String>) -> Self {
        self.tokens.insert(level.severity(), token);
        self
    }

    /// Replace the whole token table.
    pub fn with_tokens(mut self, tokens: TokenMap) -> Self {
        self.tokens = tokens;
        self
    }

    /// Token sent when the table yields none.
    pub fn with_default_token(mut self, token: impl Into<String>) -> Self {
        self.default_token = Some(token.into());
        self
    }

    /// Report delivery failures through `logger`.
    pub fn with_error_sink(mut self, logger: Arc<FemtoLogger>) -> Self {
        self.error_sink = Some(logger);
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_url()?;
        self.validate_timeout()?;
        self.validate_name()?;
        Ok(())
    }

    fn validate_url(&self) -> Result<(), HandlerBuildError> {
        match &self.url {
            None => Err(HandlerBuildError::InvalidConfig(
                "webhook handler requires a URL".into(),
            )),
            Some(url) if url.trim().is_empty() => Err(HandlerBuildError::InvalidConfig(
                "URL must not be empty".into(),
            )),
            Some(url) => {
                WebhookEndpoint::parse(url, None)?;
                Ok(())
            }
        }
    }

    fn validate_timeout(&self) -> Result<(), HandlerBuildError> {
        if let Some(timeout) = self.timeout_ms {
            ensure_positive!(timeout, "timeout_ms")?;
        }
        Ok(())
    }

    fn validate_name(&self) -> Result<(), HandlerBuildError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(HandlerBuildError::InvalidConfig(
                "name must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn build_config(&self) -> Result<WebhookHandlerConfig, HandlerBuildError> {
        self.validate()?;

        let defaults = TransportConfig::default();
        let transport = TransportConfig {
            url: self.url.clone().unwrap_or_default(),
            channel: self.channel.clone(),
            proxy: self.proxy.clone(),
            timeout: self
                .timeout_ms
                .map_or(defaults.timeout, Duration::from_millis),
            proxy_env: self.proxy_env.clone(),
        };
        let sender = SenderConfig {
            transport,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_owned()),
            queue_size: self.queue_size.unwrap_or_default(),
            default_token: self.default_token.clone(),
        };
        let mut config = WebhookHandlerConfig::new(sender);
        if let Some(level) = self.level {
            config.level = level;
        }
        config.tokens = self.tokens.clone();
        if let Some(formatter) = &self.formatter {
            config.formatter = formatter.clone();
        }
        config.error_sink = self.error_sink.clone();
        Ok(config)
    }
}

fn parse_threshold(key: &str) -> Result<u8, HandlerBuildError> {
    if key.eq_ignore_ascii_case("NOTSET") {
        return Ok(level::NOTSET);
    }
    if let Ok(threshold) = key.parse::<u8>() {
        return Ok(threshold);
    }
    key.parse::<FemtoLevel>()
        .map(FemtoLevel::severity)
        .map_err(|_| HandlerBuildError::InvalidConfig(format!("invalid token threshold: {key}")))
}

impl HandlerBuilderTrait for WebhookHandlerBuilder {
    type Handler = FemtoWebhookHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let config = self.build_config()?;
        Ok(FemtoWebhookHandler::with_config(config)?)
    }
}
