//! Format-independent header and record checks.
//!
//! Each reader decodes its payload into something implementing [`TabularSource`]; the header
//! comparison and the short-circuiting record loop are written once in [`validate_source`].

use crate::error::{FieldViolation, RecordLabel, RowError, SchemaError, ValidationResult};
use crate::types::{RawRecord, Schema, COLUMN_COUNT};
use crate::validation::RecordValidator;

/// One data line/row as produced by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line/row number in the reader's own numbering.
    pub number: usize,
    /// Raw field values, untrimmed.
    pub fields: Vec<String>,
}

/// A decoded upload viewed as a header plus data rows.
pub trait TabularSource {
    /// Word used for record locations in messages.
    fn record_label(&self) -> RecordLabel;

    /// Header cells, as found.
    fn header_row(&self) -> Vec<String>;

    /// Checked after the header. Formats that verify data presence while decoding keep the
    /// default.
    fn ensure_has_data(&self) -> Result<(), SchemaError> {
        Ok(())
    }

    /// Data rows in order, blank rows already skipped.
    fn data_rows(&self) -> Box<dyn Iterator<Item = SourceRow> + '_>;
}

/// Check `source` against `validator`'s schema.
///
/// Returns the number of data rows validated. Stops at the first failing row.
pub fn validate_source<S>(source: &S, validator: &RecordValidator) -> ValidationResult<usize>
where
    S: TabularSource + ?Sized,
{
    let label = source.record_label();
    check_header(&source.header_row(), validator.schema(), label)?;
    source.ensure_has_data()?;

    let mut rows = 0usize;
    for row in source.data_rows() {
        let record = RawRecord::from_fields(row.fields).map_err(|found| RowError {
            label,
            number: row.number,
            violation: FieldViolation::FieldCount {
                expected: COLUMN_COUNT,
                found,
            },
        })?;
        validator.check(&record, label, row.number)?;
        rows += 1;
    }
    Ok(rows)
}

/// Compare header cells with the schema, position by position.
///
/// Spreadsheet headers report an empty cell as such; text headers report it as a mismatch
/// against `''`.
pub fn check_header(header: &[String], schema: &Schema, label: RecordLabel) -> Result<(), SchemaError> {
    if header.len() != COLUMN_COUNT {
        return Err(SchemaError::ColumnCount {
            expected: COLUMN_COUNT,
            found: header.len(),
        });
    }

    for (idx0, (field, found)) in schema.fields.iter().zip(header).enumerate() {
        let found = found.trim();
        if found.is_empty() && label == RecordLabel::Row {
            return Err(SchemaError::BlankHeader {
                column: idx0 + 1,
                expected: field.name,
            });
        }
        if !field.matches_header(found) {
            return Err(SchemaError::HeaderMismatch {
                column: idx0 + 1,
                expected: field.name,
                found: found.to_string(),
            });
        }
    }
    Ok(())
}
