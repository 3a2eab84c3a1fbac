//! Core data model types for upload validation.
//!
//! A [`Schema`] is the fixed, ordered list of client columns together with the [`FieldRule`] each
//! column must satisfy. Readers turn every data line/row into a [`RawRecord`] and hand it to the
//! [`crate::validation::RecordValidator`], which answers with a [`ValidationOutcome`].

use serde::Serialize;

/// Number of columns every upload must carry.
pub const COLUMN_COUNT: usize = 5;

/// Column names in upload order. Uploader templates depend on this order.
pub const CLIENT_COLUMNS: [&str; COLUMN_COUNT] = ["Cedula", "Nombres", "Apellidos", "Telefono", "Edad"];

/// Per-column validation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Non-blank text whose length (in characters) lies in `min_len..=max_len`.
    Text { min_len: usize, max_len: usize },
    /// Non-blank phone number made only of digits, `-`, `+`, `(`, `)` and whitespace.
    Phone,
    /// Non-blank integer in `min..=max`.
    Integer { min: i32, max: i32 },
}

/// A single named column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name as it must appear in the header (compared case-insensitively).
    pub name: &'static str,
    /// Rule applied to every value of this column.
    pub rule: FieldRule,
}

impl Field {
    /// Create a new field.
    pub const fn new(name: &'static str, rule: FieldRule) -> Self {
        Self { name, rule }
    }

    /// Returns true if `header` names this field (trimmed, ASCII case-insensitive).
    pub fn matches_header(&self, header: &str) -> bool {
        header.trim().eq_ignore_ascii_case(self.name)
    }
}

/// The expected shape of an upload: exactly [`COLUMN_COUNT`] ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: [Field; COLUMN_COUNT],
}

impl Schema {
    /// The client-record schema (`Cedula, Nombres, Apellidos, Telefono, Edad`).
    pub const fn clients() -> Self {
        Self {
            fields: [
                Field::new(CLIENT_COLUMNS[0], FieldRule::Text { min_len: 6, max_len: 20 }),
                Field::new(CLIENT_COLUMNS[1], FieldRule::Text { min_len: 2, max_len: 100 }),
                Field::new(CLIENT_COLUMNS[2], FieldRule::Text { min_len: 2, max_len: 100 }),
                Field::new(CLIENT_COLUMNS[3], FieldRule::Phone),
                Field::new(CLIENT_COLUMNS[4], FieldRule::Integer { min: 0, max: 150 }),
            ],
        }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::clients()
    }
}

/// One data line/row, already split into [`COLUMN_COUNT`] fields in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: [String; COLUMN_COUNT],
}

impl RawRecord {
    /// Build a record from exactly [`COLUMN_COUNT`] fields.
    pub fn new(fields: [String; COLUMN_COUNT]) -> Self {
        Self { fields }
    }

    /// Build a record from any list of fields.
    ///
    /// Returns the field count back as `Err` when it is not [`COLUMN_COUNT`].
    pub fn from_fields(fields: Vec<String>) -> Result<Self, usize> {
        let found = fields.len();
        <[String; COLUMN_COUNT]>::try_from(fields)
            .map(Self::new)
            .map_err(|_| found)
    }

    /// Field values in schema order.
    pub fn fields(&self) -> &[String; COLUMN_COUNT] {
        &self.fields
    }
}

/// Result of validating an upload, a single record, or a whole file.
///
/// Serializes as `{"valid": .., "reason": .., "rowNumber": ..}` for hosts that answer uploads
/// with JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Whether the input passed every check.
    pub valid: bool,
    /// Human-readable reason (success message or first failure).
    pub reason: String,
    /// 1-based line/row number of the first failing record, when the failure is row-level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
}

impl ValidationOutcome {
    /// Reason reported when every check passed.
    pub const SUCCESS_REASON: &'static str = "validation succeeded";

    /// A passing outcome.
    pub fn success() -> Self {
        Self {
            valid: true,
            reason: Self::SUCCESS_REASON.to_string(),
            row_number: None,
        }
    }

    /// A failing outcome.
    pub fn failure(reason: impl Into<String>, row_number: Option<usize>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
            row_number,
        }
    }
}
