pub mod mock_webhook;
pub mod shared_buffer;

#[allow(unused_imports)]
pub use mock_webhook::{CapturedRequest, refused_url, spawn_webhook_server};
#[allow(unused_imports)]
pub use shared_buffer::SharedBuf;
