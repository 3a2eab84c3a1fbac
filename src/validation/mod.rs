//! Record-level validation shared by every upload format.
//!
//! [`RecordValidator`] is built once (it compiles the phone pattern) and borrowed by the text and
//! spreadsheet readers for every record they produce.
//!
//! ```rust
//! use client_batch_validator::types::{RawRecord, Schema};
//! use client_batch_validator::validation::RecordValidator;
//!
//! let validator = RecordValidator::new(Schema::clients());
//! let record = RawRecord::new([
//!     "123456".to_string(),
//!     "Ana".to_string(),
//!     "Lopez".to_string(),
//!     "555-1234".to_string(),
//!     "abc".to_string(),
//! ]);
//!
//! let outcome = validator.validate(&record, 2);
//! assert!(!outcome.valid);
//! assert_eq!(outcome.row_number, Some(2));
//! assert!(outcome.reason.contains("Edad must be a valid integer"));
//! ```

pub mod record;

pub use record::RecordValidator;
