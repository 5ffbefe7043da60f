//! Test-only helpers shared across crate unit tests.

pub mod collecting_handler;
pub mod mock_webhook;
pub mod shared_buffer;
