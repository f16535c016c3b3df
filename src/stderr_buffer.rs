use std::io::{self, Write};
use std::sync::Mutex;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// Activate buffering. While active, log output is stored instead of being
/// printed to stderr.
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(Vec::new());
    }
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    BUFFER
        .lock()
        .ok()
        .and_then(|mut guard| guard.take())
        .unwrap_or_default()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    if let Ok(mut guard) = BUFFER.lock() {
        if let Some(buf) = guard.as_mut() {
            buf.push(msg);
            return;
        }
    }
    eprintln!("{}", msg);
}

/// `io::Write` sink for the tracing subscriber that routes each formatted
/// event through the buffer.
///
/// Use as `fmt::layer().with_writer(StderrBufferWriter::default)`.
#[derive(Debug, Default)]
pub struct StderrBufferWriter;

impl Write for StderrBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let msg = text.trim_end_matches('\n');
        if !msg.is_empty() {
            warn(msg.to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
