//! Stream-based logging handler implementation.
//!
//! This module defines `FemtoStreamHandler`, which formats log records and
//! writes them to a stream on a background thread. The handler forwards
//! `FemtoLogRecord` values over a bounded channel so the producer never blocks
//! on I/O.

use std::{
    any::Any,
    io::{self, Write},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Sender, TrySendError, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::formatter::{DefaultFormatter, FemtoFormatter, SharedFormatter};
use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::log_record::FemtoLogRecord;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

enum StreamCommand {
    Record(FemtoLogRecord),
    Flush(Sender<()>),
}

/// Handler that writes formatted log records to an `io::Write` stream.
///
/// Each instance owns a background thread which receives records via a
/// channel and writes them to the provided stream. The writer and formatter
/// are moved into that thread so the caller never locks or blocks.
pub struct FemtoStreamHandler {
    tx: Mutex<Option<Sender<StreamCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    flush_timeout: Duration,
}

impl FemtoStreamHandler {
    /// Create a new handler writing to `stdout` with a `DefaultFormatter`.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), DefaultFormatter)
    }

    /// Create a new handler writing to `stderr` with a `DefaultFormatter`.
    pub fn stderr() -> Self {
        Self::new(io::stderr(), DefaultFormatter)
    }

    /// Create a new handler from an arbitrary writer and formatter using the default capacity.
    pub fn new<W, F>(writer: W, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: FemtoFormatter + 'static,
    {
        Self::with_capacity(writer, SharedFormatter::new(formatter), DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new handler with a custom channel capacity.
    pub fn with_capacity<W>(writer: W, formatter: SharedFormatter, capacity: usize) -> Self
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = bounded(capacity.max(1));
        let handle = thread::Builder::new()
            .name("femto-stream-handler".into())
            .spawn(move || {
                let mut writer = writer;
                for command in rx {
                    match command {
                        StreamCommand::Record(record) => {
                            let msg = formatter.format(&record);
                            if writeln!(writer, "{msg}").and_then(|_| writer.flush()).is_err() {
                                warn!("FemtoStreamHandler write error");
                            }
                        }
                        StreamCommand::Flush(ack) => {
                            let _ = writer.flush();
                            let _ = ack.send(());
                        }
                    }
                }
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("FemtoStreamHandler: failed to spawn worker thread: {err}");
                None
            }
        };
        let tx = handle.as_ref().map(|_| tx);

        Self {
            tx: Mutex::new(tx),
            handle: Mutex::new(handle),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    fn sender(&self) -> Option<Sender<StreamCommand>> {
        self.tx.lock().clone()
    }
}

impl FemtoHandlerTrait for FemtoStreamHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let Some(tx) = self.sender() else {
            return Err(HandlerError::Closed);
        };
        match tx.try_send(StreamCommand::Record(record)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("FemtoStreamHandler: queue full, dropping record");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(HandlerError::Closed),
        }
    }

    fn flush(&self) -> bool {
        let Some(tx) = self.sender() else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx
            .send_timeout(StreamCommand::Flush(ack_tx), self.flush_timeout)
            .is_err()
        {
            return false;
        }
        ack_rx.recv_timeout(self.flush_timeout).is_ok()
    }

    fn close(&self) {
        self.tx.lock().take();
        if let Some(handle) = self.handle.lock().take()
            && handle.join().is_err()
        {
            warn!("FemtoStreamHandler: worker thread panicked");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FemtoStreamHandler {
    fn drop(&mut self) {
        self.close();
    }
}
