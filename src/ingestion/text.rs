//! Pipe-delimited text uploads (`.txt`).
//!
//! Layout:
//!
//! ```text
//! Cedula|Nombres|Apellidos|Telefono|Edad
//! 123456|Ana|Lopez|5551234|30
//! ```
//!
//! Lines end with `\n`, `\r` or `\r\n`. Empty lines are dropped before numbering, so `Line N` in
//! messages is the 1-based position among the non-empty lines. Whitespace-only lines keep their
//! position but are not validated.

use csv::StringRecord;

use crate::error::{DecodeFault, RecordLabel, SchemaError, ValidationResult};
use crate::types::ValidationOutcome;
use crate::validation::RecordValidator;

use super::source::{validate_source, SourceRow, TabularSource};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Validate a pipe-delimited payload and report the first problem found.
pub fn parse_and_validate(bytes: &[u8], validator: &RecordValidator) -> ValidationOutcome {
    match validate_text(bytes, validator) {
        Ok(_) => ValidationOutcome::success(),
        Err(e) => e.to_outcome(),
    }
}

/// Validate a pipe-delimited payload, returning the number of data lines checked.
pub fn validate_text(bytes: &[u8], validator: &RecordValidator) -> ValidationResult<usize> {
    let source = PipeDelimitedSource::decode(bytes)?;
    validate_source(&source, validator)
}

/// A decoded text upload: every non-empty line split on `|`.
#[derive(Debug, Clone)]
pub struct PipeDelimitedSource {
    lines: Vec<StringRecord>,
}

impl PipeDelimitedSource {
    /// Decode `bytes` as UTF-8 text and split it into lines and fields.
    ///
    /// Fails when the text is blank or has fewer than two non-empty lines.
    pub fn decode(bytes: &[u8]) -> ValidationResult<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(DecodeFault::from)?;
        if text.trim().is_empty() {
            return Err(SchemaError::Empty.into());
        }

        // No quoting: `"` is ordinary data in these files. The reader skips empty lines and
        // treats `\r`, `\n` and `\r\n` as one terminator each.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'|')
            .quoting(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let lines = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(DecodeFault::from)?;
        if lines.len() < 2 {
            return Err(SchemaError::MissingDataLine.into());
        }

        Ok(Self { lines })
    }

    /// Number of non-empty lines, header included.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl TabularSource for PipeDelimitedSource {
    fn record_label(&self) -> RecordLabel {
        RecordLabel::Line
    }

    fn header_row(&self) -> Vec<String> {
        self.lines
            .first()
            .map(|r| r.iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn data_rows(&self) -> Box<dyn Iterator<Item = SourceRow> + '_> {
        Box::new(
            self.lines
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, record)| !is_blank_line(record))
                .map(|(idx0, record)| SourceRow {
                    number: idx0 + 1,
                    fields: record.iter().map(str::to_string).collect(),
                }),
        )
    }
}

fn is_blank_line(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(|f| f.trim().is_empty())
}
