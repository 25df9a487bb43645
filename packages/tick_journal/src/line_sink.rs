use std::io::{self, Write};
use std::ops::ControlFlow;

/// Receives a report one line at a time.
///
/// Each call returns how much output it produced (e.g. bytes written), which the report adds
/// up, or [`ControlFlow::Break`] to stop the report early.
///
/// Implemented for closures, which makes ad-hoc sinks easy:
///
/// ```
/// use std::ops::ControlFlow;
///
/// use tick_journal::{CalibrationSnapshot, Journal, ReportOptions};
///
/// let journal = Journal::new();
/// journal.entry("work").record(1000, 1);
///
/// let mut lines = Vec::new();
/// let mut sink = |line: &str| {
///     lines.push(line.to_string());
///     ControlFlow::Continue(line.len())
/// };
///
/// journal
///     .report(
///         &ReportOptions::new(),
///         &CalibrationSnapshot::from_parts(1e-9, 0.0, 1.0, 0.0),
///         &mut sink,
///     )
///     .unwrap();
///
/// assert_eq!(lines.len(), 2);
/// ```
pub trait LineSink {
    /// Accepts one line, without a line terminator.
    fn write_line(&mut self, line: &str) -> ControlFlow<(), usize>;
}

impl<F> LineSink for F
where
    F: FnMut(&str) -> ControlFlow<(), usize>,
{
    fn write_line(&mut self, line: &str) -> ControlFlow<(), usize> {
        self(line)
    }
}

/// Collects lines into a string, each terminated by `\n`.
///
/// Reports the number of bytes appended per line, terminator included.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringSink {
    text: String,
}

impl StringSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The written lines, without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Consumes the sink, returning everything written.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

impl LineSink for StringSink {
    fn write_line(&mut self, line: &str) -> ControlFlow<(), usize> {
        self.text.push_str(line);
        self.text.push('\n');

        ControlFlow::Continue(line.len().saturating_add(1))
    }
}

/// Writes lines to an [`io::Write`], each terminated by `\n`.
///
/// The first I/O error stops the report and is kept for inspection via
/// [`error()`][Self::error].
///
/// # Example
///
/// ```
/// use tick_journal::{CalibrationSnapshot, IoSink, Journal, ReportOptions};
///
/// let journal = Journal::new();
/// journal.entry("work").record(1000, 1);
///
/// let mut sink = IoSink::new(std::io::stdout().lock());
///
/// journal
///     .report(
///         &ReportOptions::new(),
///         &CalibrationSnapshot::from_parts(1e-9, 0.0, 1.0, 0.0),
///         &mut sink,
///     )
///     .unwrap();
///
/// assert!(sink.error().is_none());
/// ```
#[derive(Debug)]
pub struct IoSink<W> {
    writer: W,
    error: Option<io::Error>,
}

impl<W> IoSink<W>
where
    W: Write,
{
    /// Creates a sink writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// The I/O error that stopped the sink, if any.
    #[must_use]
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> LineSink for IoSink<W>
where
    W: Write,
{
    fn write_line(&mut self, line: &str) -> ControlFlow<(), usize> {
        if self.error.is_some() {
            return ControlFlow::Break(());
        }

        match writeln!(self.writer, "{line}") {
            Ok(()) => ControlFlow::Continue(line.len().saturating_add(1)),
            Err(error) => {
                self.error = Some(error);
                ControlFlow::Break(())
            }
        }
    }
}
