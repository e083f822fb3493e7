//! Log capture into a [`LogBuffer`] via `tracing_subscriber`.

use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use crate::logfile::buffer::LogBuffer;

/// A writer appending formatted log events to a shared [`LogBuffer`].
///
/// Plug into a `fmt` layer with `.with_writer(writer).with_ansi(false)`.
#[derive(Debug, Clone)]
pub struct LogBufferWriter {
    buffer: Arc<LogBuffer>,
}

impl LogBufferWriter {
    pub fn new(buffer: Arc<LogBuffer>) -> Self {
        Self { buffer }
    }
}

impl io::Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBufferWriter {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
