//! Runtime configuration for [`FemtoWebhookHandler`](super::FemtoWebhookHandler).

use std::sync::Arc;

use crate::formatter::SharedFormatter;
use crate::level::FemtoLevel;
use crate::logger::FemtoLogger;
use crate::webhook::SenderConfig;

use super::tokens::TokenMap;

/// Everything needed to start a webhook handler.
///
/// `sender.name` doubles as the handler name in error reports.
#[derive(Clone, Debug)]
pub struct WebhookHandlerConfig {
    pub sender: SenderConfig,
    /// Records below this level are ignored.
    pub level: FemtoLevel,
    pub tokens: TokenMap,
    pub formatter: SharedFormatter,
    pub error_sink: Option<Arc<FemtoLogger>>,
}

impl WebhookHandlerConfig {
    pub fn new(sender: SenderConfig) -> Self {
        Self {
            sender,
            level: FemtoLevel::Trace,
            tokens: TokenMap::new(),
            formatter: SharedFormatter::default(),
            error_sink: None,
        }
    }
}

impl Default for WebhookHandlerConfig {
    fn default() -> Self {
        Self::new(SenderConfig::default())
    }
}
