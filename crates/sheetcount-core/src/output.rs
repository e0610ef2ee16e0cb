//! Output formatting for analysis reports on the command line.
//!
//! Reports are written either as one JSON document or as JSON Lines, one
//! report per analysed file.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::AnalysisReport;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object, or an array for several files
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// A report labelled with the file it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSON Lines are always compact.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write a single item followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write several items: a JSON array, or one line each for JSONL.
    ///
    /// A single item in JSON format is written bare, not wrapped in an array.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match (self.format, items) {
            (OutputFormat::Json, [single]) => self.write(single),
            (OutputFormat::Json, _) => self.write(&items),
            (OutputFormat::JsonLines, _) => items.iter().try_for_each(|item| self.write(item)),
        }
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorReport;

    fn failure(file_name: &str, message: &str) -> FileReport {
        FileReport {
            file_name: file_name.to_string(),
            report: AnalysisReport::Failure(ErrorReport::new(message)),
        }
    }

    #[test]
    fn test_file_report_flattens_error() {
        let json = serde_json::to_string(&failure("a.png", "boom")).unwrap();
        assert_eq!(json, r#"{"file_name":"a.png","error":"boom"}"#);
    }

    #[test]
    fn test_single_json_item_is_bare() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&[failure("a.png", "boom")]).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('{'));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_several_json_items_form_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, true);
        writer
            .write_all(&[failure("a.png", "x"), failure("b.png", "y")])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_write_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write_all(&[failure("a.png", "x"), failure("b.png", "y")])
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"b.png\""));
    }
}
