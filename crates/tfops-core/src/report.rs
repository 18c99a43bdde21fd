//! Operator-facing output.
//!
//! A `Reporter` is built once by each binary and handed to the deployer and
//! bootstrapper; nothing in this crate prints through globals.

use chrono::Local;
use colored::Colorize;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub color: bool,
    pub timestamps: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            color: true,
            timestamps: true,
        }
    }
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self {
            color: false,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn glyph(self) -> &'static str {
        match self {
            Level::Info => "",
            Level::Success => "✅ ",
            Level::Warning => "⚠️  ",
            Level::Error => "❌ ",
        }
    }
}

pub struct Reporter {
    style: ReportStyle,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
    pub fn new(style: ReportStyle, sink: Box<dyn Write + Send>) -> Self {
        Self {
            style,
            sink: Mutex::new(sink),
        }
    }

    pub fn stdout(style: ReportStyle) -> Self {
        Self::new(style, Box::new(std::io::stdout()))
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.log(Level::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn log(&self, level: Level, message: &str) {
        let mut line = String::new();
        if self.style.timestamps {
            line.push_str(&format!("[{}] ", Local::now().format("%Y-%m-%d %H:%M:%S")));
        }
        line.push_str(level.glyph());
        line.push_str(message);
        let rendered = if self.style.color {
            match level {
                Level::Info => line.blue().to_string(),
                Level::Success => line.green().to_string(),
                Level::Warning => line.yellow().to_string(),
                Level::Error => line.red().to_string(),
            }
        } else {
            line
        };
        self.line(&rendered);
    }

    /// Unstyled line, e.g. output values and summaries.
    pub fn line(&self, text: &str) {
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Losing a line of operator output is not worth failing the run over.
        let _ = writeln!(sink, "{text}");
        let _ = sink.flush();
    }

    /// Print `text` without a trailing newline, for prompts.
    pub fn prompt(&self, text: &str) {
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = write!(sink, "{text}");
        let _ = sink.flush();
    }
}

/// Clonable in-memory sink; every clone appends to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferSink(Arc<Mutex<Vec<u8>>>);

impl BufferSink {
    pub fn contents(&self) -> String {
        let buf = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for BufferSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        let mut buf = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
