//! `tracing` output for the browser.
//!
//! Formatted events are buffered per event and handed to the matching
//! `console` method once the formatter drops the writer.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber.
pub fn init(filter: &str) {
    let env_filter = match EnvFilter::try_new(filter) {
        Ok(f) => f,
        Err(err) => {
            emit(
                Level::WARN,
                &format!("invalid log filter {filter:?} ({err}), using {FALLBACK_FILTER:?}"),
            );
            EnvFilter::new(FALLBACK_FILTER)
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(MakeConsoleWriter)
        .without_time()
        .with_ansi(false)
        .try_init();
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::with_capacity(128),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = console_line(&self.buf) {
            emit(self.level, &line);
        }
    }
}

/// Formatter output minus the trailing newline; `None` when empty.
fn console_line(buf: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let line = text.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use wasm_bindgen::JsValue;

    let value = JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::log_1(&value),
        Level::DEBUG | Level::TRACE => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

#[cfg(test)]
mod tests {
    use super::{MakeConsoleWriter, console_line};
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn strips_trailing_newline() {
        assert_eq!(
            console_line(b" INFO scene::click: Clicked at latitude: 38.00\n").as_deref(),
            Some(" INFO scene::click: Clicked at latitude: 38.00")
        );
    }

    #[test]
    fn blank_output_is_dropped() {
        assert_eq!(console_line(b"\n"), None);
        assert_eq!(console_line(b""), None);
    }

    #[test]
    fn writer_accepts_partial_writes() {
        let make = MakeConsoleWriter;
        let mut w = make.make_writer();
        w.write_all(b"part one, ").expect("write");
        w.write_all(b"part two\n").expect("write");
        assert_eq!(console_line(&w.buf).as_deref(), Some("part one, part two"));
    }
}
