//! Shared buffer for capturing handler output in integration tests.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe byte buffer implementing `Write`.
///
/// Clones share storage, so a handler can own one while the test reads
/// another.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Buffer contents decoded as UTF-8.
    #[allow(dead_code)]
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
