//! Public handler type exported by the crate.

use std::any::Any;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::error;
use thiserror::Error;

use crate::formatter::SharedFormatter;
use crate::handler::{FemtoHandlerTrait, HandlerError, HandlerId};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use crate::logger::FemtoLogger;
use crate::webhook::{ErrorCallback, SenderError, WebhookSender};

use super::config::WebhookHandlerConfig;
use super::error_sink::{ErrorRouter, ErrorSinkError};
use super::tokens::TokenMap;

/// Failures while starting a [`FemtoWebhookHandler`].
#[derive(Debug, Error)]
pub enum WebhookHandlerError {
    #[error(transparent)]
    Sender(#[from] SenderError),
    #[error(transparent)]
    ErrorSink(#[from] ErrorSinkError),
}

/// Handler posting formatted records to a chat webhook.
///
/// Records at or above the handler level are formatted, tagged with the
/// token for their severity and queued on a [`WebhookSender`]. Delivery
/// failures are routed through the handler's error sink, or written to
/// standard error when no sink is set.
pub struct FemtoWebhookHandler {
    id: HandlerId,
    name: String,
    level: FemtoLevel,
    tokens: TokenMap,
    formatter: SharedFormatter,
    router: Arc<ErrorRouter>,
    sender: WebhookSender<FemtoLogRecord>,
    /// Upper bound for `flush`; the configured request timeout.
    flush_timeout: Duration,
    closed: AtomicBool,
}

impl FemtoWebhookHandler {
    /// Start the handler and its delivery worker.
    pub fn with_config(config: WebhookHandlerConfig) -> Result<Self, WebhookHandlerError> {
        let WebhookHandlerConfig {
            sender,
            level,
            tokens,
            formatter,
            error_sink,
        } = config;
        let id = HandlerId::next();
        let name = sender.name.clone();
        let flush_timeout = sender.transport.timeout;
        let router = Arc::new(ErrorRouter::new(id, name.clone()));
        router.set_error_sink(error_sink)?;
        let sender = WebhookSender::with_config(sender, route_errors(Arc::clone(&router)))?;
        Ok(Self {
            id,
            name,
            level,
            tokens,
            formatter,
            router,
            sender,
            flush_timeout,
            closed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn tokens(&self) -> &TokenMap {
        &self.tokens
    }

    pub fn sender(&self) -> &WebhookSender<FemtoLogRecord> {
        &self.sender
    }

    pub fn error_sink(&self) -> Option<Arc<FemtoLogger>> {
        self.router.error_sink()
    }

    /// Route delivery failures to `sink`, or to stderr with `None`.
    ///
    /// # Errors
    ///
    /// [`ErrorSinkError::Cycle`] if records logged on `sink` would reach
    /// this handler.
    pub fn set_error_sink(&self, sink: Option<Arc<FemtoLogger>>) -> Result<(), ErrorSinkError> {
        self.router.set_error_sink(sink)
    }

    pub fn clear_error_sink(&self) {
        self.router.clear_error_sink();
    }

    /// Replace the writer used when no error sink is configured.
    pub fn set_fallback_writer<W: Write + Send + 'static>(&self, writer: W) {
        self.router.set_fallback(writer);
    }

    /// Report a failure through the error sink.
    pub fn report_error(
        &self,
        record: Option<&FemtoLogRecord>,
        message: &str,
    ) -> Result<(), HandlerError> {
        self.router.report_error(record, message)
    }

    /// Queue `record` without consulting the handler level.
    pub fn emit(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HandlerError::Closed);
        }
        let text = self.formatter.format(&record);
        let token = self
            .tokens
            .resolve(record.level().severity())
            .map(str::to_owned);
        self.sender.send(text, token, Some(record));
        Ok(())
    }
}

/// Worker callback forwarding failures to `router`.
fn route_errors(router: Arc<ErrorRouter>) -> ErrorCallback<FemtoLogRecord> {
    Arc::new(move |record, message| {
        if let Err(err) = router.report_error(record, message) {
            error!("FemtoWebhookHandler: {err}");
        }
    })
}

impl FemtoHandlerTrait for FemtoWebhookHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        if record.level() < self.level {
            return Ok(());
        }
        self.emit(record)
    }

    fn flush(&self) -> bool {
        self.sender.wait_sent_timeout(self.flush_timeout)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.sender.shutdown();
    }

    fn handler_id(&self) -> Option<HandlerId> {
        Some(self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FemtoWebhookHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FemtoWebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoWebhookHandler")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("level", &self.level)
            .field("tokens", &self.tokens)
            .field("router", &self.router)
            .field("sender", &self.sender)
            .finish()
    }
}
