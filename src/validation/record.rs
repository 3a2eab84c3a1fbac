//! Field rules for a single [`RawRecord`].

use regex::Regex;

use crate::error::{FieldViolation, RecordLabel, RowError};
use crate::types::{Field, FieldRule, RawRecord, Schema, ValidationOutcome};

const PHONE_PATTERN: &str = r"^[\d\-\+\(\)\s]+$";

/// Applies a [`Schema`]'s field rules to records, stopping at the first failing field.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    schema: Schema,
    phone: Regex,
}

impl RecordValidator {
    /// Create a validator for `schema`.
    pub fn new(schema: Schema) -> Self {
        let phone = Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex");
        Self { schema, phone }
    }

    /// Schema this validator checks against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate one record. `row_number` is the 1-based line/row it came from.
    ///
    /// Failures are reported as row-level outcomes in the `Line N:` form; later fields are not
    /// evaluated. Readers that name records differently go through [`Self::check`].
    pub fn validate(&self, record: &RawRecord, row_number: usize) -> ValidationOutcome {
        match self.check(record, RecordLabel::Line, row_number) {
            Ok(()) => ValidationOutcome::success(),
            Err(e) => ValidationOutcome::failure(e.to_string(), Some(row_number)),
        }
    }

    /// Like [`Self::validate`], but returns the typed error labelled for the calling reader.
    pub fn check(&self, record: &RawRecord, label: RecordLabel, number: usize) -> Result<(), RowError> {
        for (field, raw) in self.schema.fields.iter().zip(record.fields()) {
            self.check_field(field, raw.trim())
                .map_err(|violation| RowError { label, number, violation })?;
        }
        Ok(())
    }

    fn check_field(&self, field: &Field, value: &str) -> Result<(), FieldViolation> {
        let column = field.name;
        if value.is_empty() {
            return Err(FieldViolation::Blank { column });
        }

        match field.rule {
            FieldRule::Text { min_len, max_len } => {
                let len = value.chars().count();
                if len < min_len || len > max_len {
                    return Err(FieldViolation::Length {
                        column,
                        min: min_len,
                        max: max_len,
                    });
                }
            }
            FieldRule::Phone => {
                if !self.phone.is_match(value) {
                    return Err(FieldViolation::Pattern { column });
                }
            }
            FieldRule::Integer { min, max } => {
                let parsed = value.parse::<i32>().map_err(|_| FieldViolation::NotInteger {
                    column,
                    raw: value.to_string(),
                })?;
                if parsed < min || parsed > max {
                    return Err(FieldViolation::OutOfRange {
                        column,
                        min,
                        max,
                        value: parsed,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(Schema::clients())
    }
}
