//! Upload admission and format readers.
//!
//! Most callers should use [`IngestionGate`] (from [`gate`]) which:
//!
//! - applies the [`AdmissionPolicy`] (presence, extension allow-list, size ceiling)
//! - buffers the payload and dispatches it by extension to [`text`] or [`excel`]
//! - optionally reports acceptances/rejections/alerts to a [`ValidationObserver`]
//!
//! Both readers implement [`source::TabularSource`] so the header check and the record loop are
//! shared.

pub mod excel;
pub mod gate;
pub mod observability;
pub mod source;
pub mod text;

pub use gate::{AdmissionPolicy, GateDecision, GateOptions, IngestionGate, UploadFormat};
pub use observability::{
    CompositeObserver, FileObserver, TracingObserver, ValidationContext, ValidationObserver,
    ValidationSeverity, ValidationStats,
};
pub use source::{SourceRow, TabularSource};
