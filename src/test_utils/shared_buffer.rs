//! In-memory writer for capturing handler output in tests.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe byte buffer implementing `Write`.
///
/// Clones share the same storage, so one clone can be handed to a handler
/// while the test keeps another for assertions.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the buffer contents decoded as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
