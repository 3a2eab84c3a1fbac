use std::fmt;

use thiserror::Error;

use crate::types::ValidationOutcome;

/// Convenience result type for internal validation steps.
pub type ValidationResult<T> = Result<T, Rejection>;

/// Why an upload was turned away.
///
/// The [`fmt::Display`] output of every variant is the user-facing reason placed in
/// [`ValidationOutcome::reason`].
#[derive(Debug, Error)]
pub enum Rejection {
    /// The upload failed presence/extension/size checks; nothing was parsed.
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    /// The header (or overall file shape) is wrong; no record was checked.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A single record violated a rule; later records were not checked.
    #[error(transparent)]
    Row(#[from] RowError),

    /// The payload could not be decoded as the declared format.
    #[error("failed to validate file: {0}")]
    Decode(#[from] DecodeFault),
}

impl Rejection {
    /// 1-based line/row number for row-level rejections.
    pub fn row_number(&self) -> Option<usize> {
        match self {
            Self::Row(e) => Some(e.number),
            _ => None,
        }
    }

    /// Convert into a failing [`ValidationOutcome`].
    pub fn to_outcome(&self) -> ValidationOutcome {
        ValidationOutcome::failure(self.to_string(), self.row_number())
    }
}

/// Pre-parsing admission failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("no file received")]
    NoFile,

    #[error("unsupported extension '{extension}': only {allowed} files are accepted")]
    UnsupportedExtension { extension: String, allowed: String },

    #[error("file exceeds size ceiling: maximum size is {} ({max_bytes} bytes), got {found_bytes} bytes", human_size(.max_bytes))]
    TooLarge { max_bytes: u64, found_bytes: u64 },
}

/// File-level structural failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("file is empty")]
    Empty,

    #[error("file needs a header line and at least one data line")]
    MissingDataLine,

    #[error("expected exactly {expected} pipe-separated columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {column} of the header is empty, expected '{expected}'")]
    BlankHeader { column: usize, expected: &'static str },

    #[error("column {column} must be '{expected}', but found '{found}'")]
    HeaderMismatch {
        column: usize,
        expected: &'static str,
        found: String,
    },

    #[error("no worksheet present")]
    NoWorksheet,

    #[error("worksheet is empty")]
    EmptyWorksheet,

    #[error("file needs at least one data row besides the header")]
    NoDataRows,
}

/// How a reader names its records in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLabel {
    /// Text uploads: lines.
    Line,
    /// Spreadsheet uploads: rows.
    Row,
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => f.write_str("Line"),
            Self::Row => f.write_str("Row"),
        }
    }
}

/// A record-level failure, located by its 1-based line/row number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} {number}: {violation}")]
pub struct RowError {
    pub label: RecordLabel,
    pub number: usize,
    pub violation: FieldViolation,
}

/// The first rule a record broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldViolation {
    #[error("expected {expected} fields separated by '|', found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{column} must not be empty")]
    Blank { column: &'static str },

    #[error("{column} must be between {min} and {max} characters")]
    Length {
        column: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{column} has an invalid format")]
    Pattern { column: &'static str },

    #[error("{column} must be a valid integer, found '{raw}'")]
    NotInteger { column: &'static str, raw: String },

    #[error("{column} must be between {min} and {max}, found {value}")]
    OutOfRange {
        column: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },
}

/// The payload could not be decoded at all.
#[derive(Debug, Error)]
pub enum DecodeFault {
    /// Reading the upload stream failed.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// Text payload is not valid UTF-8.
    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Pipe-delimited payload could not be tokenized.
    #[error("text error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook payload is corrupt or not an `.xlsx` file.
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),
}

/// Failure loading an [`crate::ingestion::AdmissionPolicy`] from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid policy config: {0}")]
    Json(#[from] serde_json::Error),
}

fn human_size(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_error_message_carries_label_and_number() {
        let err = RowError {
            label: RecordLabel::Row,
            number: 2,
            violation: FieldViolation::Pattern { column: "Telefono" },
        };
        assert_eq!(err.to_string(), "Row 2: Telefono has an invalid format");

        let rejection = Rejection::from(err);
        assert_eq!(rejection.row_number(), Some(2));
        let outcome = rejection.to_outcome();
        assert!(!outcome.valid);
        assert_eq!(outcome.row_number, Some(2));
    }

    #[test]
    fn decode_fault_is_prefixed_with_generic_reason() {
        let err = std::str::from_utf8(&[0xff, 0xfe, 0x00]).unwrap_err();
        let rejection = Rejection::from(DecodeFault::from(err));
        assert!(rejection.to_string().starts_with("failed to validate file: "));
        assert_eq!(rejection.row_number(), None);
    }

    #[test]
    fn too_large_reports_megabytes() {
        let err = AdmissionError::TooLarge {
            max_bytes: 5 * 1024 * 1024,
            found_bytes: 6 * 1024 * 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("exceeds size ceiling"));
        assert!(msg.contains("5 MB"));
    }
}
