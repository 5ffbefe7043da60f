//! Handler builders and associated traits.
//!
//! Provides a minimal builder API for constructing handlers in a
//! type‑safe manner. Each builder implements [`HandlerBuilderTrait`]
//! which returns a boxed [`FemtoHandlerTrait`] ready for registration
//! with a logger.

use std::io;

use thiserror::Error;

use crate::handler::FemtoHandlerTrait;
use crate::webhook::{EndpointError, SenderError};
use crate::webhook_handler::{ErrorSinkError, WebhookHandlerError};

pub mod webhook_builder;

pub use webhook_builder::{WebhookHandlerBuilder, WebhookSettings};

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The webhook URL could not be used.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    /// The requested error sink would route failures back into the handler.
    #[error(transparent)]
    Cycle(#[from] ErrorSinkError),
    /// Underlying I/O error whilst creating the handler.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<WebhookHandlerError> for HandlerBuildError {
    fn from(err: WebhookHandlerError) -> Self {
        match err {
            WebhookHandlerError::Sender(SenderError::Endpoint(err)) => Self::Endpoint(err),
            WebhookHandlerError::Sender(SenderError::Spawn(err)) => Self::Io(err),
            WebhookHandlerError::ErrorSink(err) => Self::Cycle(err),
        }
    }
}

/// Trait implemented by all handler builders.
///
/// Builders return boxed [`FemtoHandlerTrait`] objects so the caller can
/// register them without knowing the concrete handler type.
pub trait HandlerBuilderTrait: Send + Sync {
    type Handler: FemtoHandlerTrait + 'static;

    /// Build the concrete handler.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;

    /// Build the handler instance.
    fn build(&self) -> Result<Box<dyn FemtoHandlerTrait>, HandlerBuildError> {
        Ok(Box::new(self.build_inner()?))
    }
}
