//! Excel workbook uploads (`.xlsx`).
//!
//! Only the first sheet is read. The header is row 1, columns A–E; data rows are every used row
//! (any non-empty cell) below it, numbered with spreadsheet row numbers.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};

use crate::error::{DecodeFault, RecordLabel, SchemaError, ValidationResult};
use crate::types::{ValidationOutcome, COLUMN_COUNT};
use crate::validation::RecordValidator;

use super::source::{validate_source, SourceRow, TabularSource};

/// Validate a workbook payload and report the first problem found.
pub fn parse_and_validate(bytes: &[u8], validator: &RecordValidator) -> ValidationOutcome {
    match validate_workbook(bytes, validator) {
        Ok(_) => ValidationOutcome::success(),
        Err(e) => e.to_outcome(),
    }
}

/// Validate a workbook payload, returning the number of data rows checked.
pub fn validate_workbook(bytes: &[u8], validator: &RecordValidator) -> ValidationResult<usize> {
    let source = WorkbookSource::decode(bytes)?;
    validate_source(&source, validator)
}

/// The first worksheet of a decoded workbook.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    range: Range<Data>,
    // 0-based absolute indices of rows holding at least one non-empty cell.
    used_rows: Vec<u32>,
}

impl WorkbookSource {
    /// Open an in-memory `.xlsx` payload and load its first sheet.
    pub fn decode(bytes: &[u8]) -> ValidationResult<Self> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(DecodeFault::from)?;

        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(SchemaError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet).map_err(DecodeFault::from)?;

        let first_row = range.start().map(|(row, _)| row).unwrap_or(0);
        let used_rows: Vec<u32> = range
            .rows()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !matches!(c, Data::Empty)))
            .map(|(offset, _)| first_row + offset as u32)
            .collect();
        if used_rows.is_empty() {
            return Err(SchemaError::EmptyWorksheet.into());
        }

        Ok(Self { range, used_rows })
    }

    /// Number of rows holding data, header included.
    pub fn used_row_count(&self) -> usize {
        self.used_rows.len()
    }

    fn row_cells(&self, row: u32) -> Vec<String> {
        (0..COLUMN_COUNT as u32)
            .map(|col| {
                self.range
                    .get_value((row, col))
                    .map(cell_to_string)
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl TabularSource for WorkbookSource {
    fn record_label(&self) -> RecordLabel {
        RecordLabel::Row
    }

    fn header_row(&self) -> Vec<String> {
        self.row_cells(0)
    }

    fn ensure_has_data(&self) -> Result<(), SchemaError> {
        if self.used_rows.len() < 2 {
            return Err(SchemaError::NoDataRows);
        }
        Ok(())
    }

    fn data_rows(&self) -> Box<dyn Iterator<Item = SourceRow> + '_> {
        Box::new(
            self.used_rows
                .iter()
                .copied()
                .filter(|&row| row >= 1)
                .map(|row| SourceRow {
                    number: row as usize + 1,
                    fields: self.row_cells(row),
                }),
        )
    }
}

/// Text of a cell as the user sees it. Whole numbers lose their `.0`.
fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_print_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(30.0)), "30");
        assert_eq!(cell_to_string(&Data::Float(1234567890.0)), "1234567890");
        assert_eq!(cell_to_string(&Data::Float(30.5)), "30.5");
        assert_eq!(cell_to_string(&Data::Int(-1)), "-1");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn garbage_bytes_are_a_decode_fault() {
        let err = WorkbookSource::decode(b"definitely not a zip archive").unwrap_err();
        assert!(err.to_string().starts_with("failed to validate file: workbook error"));
    }
}
