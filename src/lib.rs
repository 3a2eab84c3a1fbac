//! `client-batch-validator` checks client-record batch uploads before they are forwarded to the
//! processing API.
//!
//! The primary entrypoint is [`ingestion::IngestionGate::admit`], which applies the admission
//! policy (presence, extension, size), picks a reader from the file extension and returns a
//! [`types::ValidationOutcome`].
//!
//! ## Accepted uploads
//!
//! **Formats (selected by extension):**
//!
//! - **Pipe-delimited text**: `.txt`, one record per line, fields separated by `|`
//! - **Excel workbook**: `.xlsx`, first sheet, header in row 1, columns A–E
//!
//! **Header** (order-sensitive, case-insensitive): `Cedula | Nombres | Apellidos | Telefono | Edad`
//!
//! **Field rules** (values are trimmed first; the first failing field is reported):
//!
//! - `Cedula`: 6–20 characters
//! - `Nombres`, `Apellidos`: 2–100 characters
//! - `Telefono`: digits, spaces and `- + ( )` only
//! - `Edad`: integer between 0 and 150
//!
//! Validation stops at the first failing line/row; its 1-based number is reported in
//! [`types::ValidationOutcome::row_number`].
//!
//! ## Quick example
//!
//! ```rust
//! use client_batch_validator::ingestion::{GateOptions, IngestionGate};
//!
//! let gate = IngestionGate::new(GateOptions::default());
//!
//! let payload = "Cedula|Nombres|Apellidos|Telefono|Edad\n\
//!                123456|Ana|Lopez|5551234|30\n\
//!                654321|Luis|Mora|abc#|41\n";
//! let outcome = gate.admit("clientes.txt", "text/plain", payload.len() as u64, Some(payload.as_bytes()));
//!
//! assert!(!outcome.valid);
//! assert_eq!(outcome.row_number, Some(3));
//! assert_eq!(outcome.reason, "Line 3: Telefono has an invalid format");
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: admission gate, text/spreadsheet readers, observers
//! - [`validation`]: per-record field rules
//! - [`types`]: schema, records and outcomes
//! - [`error`]: rejection taxonomy
//! - [`logging`]: `tracing` subscriber setup

pub mod error;
pub mod ingestion;
pub mod logging;
pub mod types;
pub mod validation;

pub use error::{Rejection, ValidationResult};
pub use types::ValidationOutcome;
