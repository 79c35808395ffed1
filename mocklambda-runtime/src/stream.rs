//! Diagnostic stream shared by the harness and the handler's log callback

use bytes::Bytes;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Callback handed to the handler for writing log lines
pub type LogAction = Arc<dyn Fn(&str) + Send + Sync>;

/// Line-oriented writer for the diagnostic stream (stderr in the CLI)
#[derive(Clone)]
pub struct DiagnosticStream {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DiagnosticStream {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write `text` followed by a newline and flush
    pub fn line(&self, text: &str) -> io::Result<()> {
        let mut writer = self.inner.lock();
        writeln!(writer, "{text}")?;
        writer.flush()
    }

    /// Log callback for handler code. Write failures are dropped: a handler that logs
    /// must not fail because stderr went away.
    pub fn log_action(&self) -> LogAction {
        let stream = self.clone();
        Arc::new(move |text: &str| {
            let _ = stream.line(text);
        })
    }
}

impl std::fmt::Debug for DiagnosticStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticStream").finish_non_exhaustive()
    }
}

/// In-memory writer whose contents stay readable after being handed to a stream
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Drain the buffer, leaving it empty
    pub fn take(&self) -> Bytes {
        Bytes::from(std::mem::take(&mut *self.0.lock()))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_appends_newline() {
        let buffer = SharedBuffer::new();
        let stream = DiagnosticStream::new(buffer.clone());

        stream.line("first").unwrap();
        stream.line("second").unwrap();

        assert_eq!(buffer.contents(), "first\nsecond\n");
    }

    #[test]
    fn test_log_action_writes_to_same_stream() {
        let buffer = SharedBuffer::new();
        let stream = DiagnosticStream::new(buffer.clone());
        let log = stream.log_action();

        stream.line("START").unwrap();
        log("from handler");

        assert_eq!(buffer.contents(), "START\nfrom handler\n");
    }

    #[test]
    fn test_take_drains_shared_contents() {
        let buffer = SharedBuffer::new();
        let mut writer = buffer.clone();
        writer.write_all(b"payload").unwrap();

        assert_eq!(buffer.take(), Bytes::from_static(b"payload"));
        assert_eq!(buffer.contents(), "");
    }
}
