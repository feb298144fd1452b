//! Display sinks that receive rendered `<audio>` elements.

use std::io::{self, Write};

/// Destination for rendered HTML.
pub trait DisplaySink {
    /// Shows a raw HTML fragment.
    fn display_html(&mut self, html: &str) -> io::Result<()>;
}

/// Keeps every fragment in memory, in display order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    fragments: Vec<String>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments received so far.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The most recently displayed fragment.
    pub fn last(&self) -> Option<&str> {
        self.fragments.last().map(String::as_str)
    }

    /// Consumes the sink, returning its fragments.
    pub fn into_fragments(self) -> Vec<String> {
        self.fragments
    }
}

impl DisplaySink for CollectingSink {
    fn display_html(&mut self, html: &str) -> io::Result<()> {
        self.fragments.push(html.to_string());
        Ok(())
    }
}

/// Writes each fragment on its own line to an [`io::Write`].
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DisplaySink for WriterSink<W> {
    fn display_html(&mut self, html: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", html)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.display_html("<a>").unwrap();
        sink.display_html("<b>").unwrap();
        assert_eq!(sink.fragments(), &["<a>".to_string(), "<b>".to_string()]);
        assert_eq!(sink.last(), Some("<b>"));
    }

    #[test]
    fn test_writer_sink_appends_lines() {
        let mut sink = WriterSink::new(Vec::new());
        sink.display_html("<audio></audio>").unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "<audio></audio>\n");
    }
}
