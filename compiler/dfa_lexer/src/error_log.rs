//! Recorded lexical errors.
//!
//! The log is append-only. Records keep the full sanitized text of the
//! offending span; only their display form is shortened.

use std::fmt;
use std::io::{self, Write};

use log::warn;

/// Number of characters of offending text shown when a record is displayed.
pub const DEFAULT_MAX_DISPLAY_LEN: usize = 32;

/// One lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// 1-based line of the offending text
    pub line: usize,
    /// 1-based column of the offending text
    pub column: usize,
    /// The offending text with non-printable symbols replaced by spaces
    pub text: String,
    /// What the evaluator had to say about it
    pub message: String,
}

impl ErrorRecord {
    /// Builds a record, sanitizing `text`.
    pub fn new(line: usize, column: usize, text: &[u8], message: String) -> Self {
        Self {
            line,
            column,
            text: sanitize(text),
            message,
        }
    }

    /// A displayable form that shows at most `max_len` characters of the text.
    pub fn display(&self, max_len: usize) -> DisplayRecord<'_> {
        DisplayRecord {
            record: self,
            max_len,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(DEFAULT_MAX_DISPLAY_LEN).fmt(f)
    }
}

/// See [`ErrorRecord::display`].
pub struct DisplayRecord<'a> {
    record: &'a ErrorRecord,
    max_len: usize,
}

impl fmt::Display for DisplayRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        write!(f, "{}:{}: lexical error: Got \"", record.line, record.column)?;
        if record.text.chars().count() > self.max_len {
            let shown: String = record.text.chars().take(self.max_len).collect();
            write!(f, "{shown}...")?;
        } else {
            write!(f, "{}", record.text)?;
        }
        write!(f, "\". {}", record.message)
    }
}

/// Replaces every symbol that is not printable ASCII with a space.
fn sanitize(text: &[u8]) -> String {
    text.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                ' '
            }
        })
        .collect()
}

/// The append-only list of lexical errors found so far.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
    report_immediately: bool,
    max_display_len: usize,
}

impl ErrorLog {
    /// Creates an empty log. With `report_immediately`, every record is also
    /// written to stderr as soon as it is added.
    pub fn new(report_immediately: bool, max_display_len: usize) -> Self {
        Self {
            records: Vec::new(),
            report_immediately,
            max_display_len,
        }
    }

    /// Sanitizes `text` and appends a record.
    pub fn record(&mut self, line: usize, column: usize, text: &[u8], message: String) -> &ErrorRecord {
        let record = ErrorRecord::new(line, column, text, message);
        warn!("{}", record.display(self.max_display_len));
        if self.report_immediately {
            if let Err(e) = self.report(&mut io::stderr().lock(), &record) {
                warn!("failed to report lexical error: {}", e);
            }
        }
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Writes one record on its own line, shortened to the display cap.
    fn report<W: Write>(&self, out: &mut W, record: &ErrorRecord) -> io::Result<()> {
        writeln!(out, "{}", record.display(self.max_display_len))
    }

    /// The records in the order they were added. Each call starts over.
    pub fn records(&self) -> std::slice::Iter<'_, ErrorRecord> {
        self.records.iter()
    }

    /// The records formatted with this log's display cap.
    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.records
            .iter()
            .map(move |record| record.display(self.max_display_len).to_string())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Consumes the log and returns its records.
    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}
