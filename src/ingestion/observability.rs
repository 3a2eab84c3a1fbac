use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DecodeFault, Rejection};

use super::gate::UploadFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    /// Upload turned away before parsing (missing file, wrong type, too large).
    Warning,
    /// File content failed validation or could not be decoded.
    Error,
    /// The upload stream itself could not be read.
    Critical,
}

impl ValidationSeverity {
    /// Severity assigned to a rejection.
    pub fn of(rejection: &Rejection) -> Self {
        match rejection {
            Rejection::Admission(_) => Self::Warning,
            Rejection::Schema(_) | Rejection::Row(_) => Self::Error,
            Rejection::Decode(DecodeFault::Read(_)) => Self::Critical,
            Rejection::Decode(_) => Self::Error,
        }
    }
}

/// Context about a validation attempt.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Declared file name.
    pub file_name: String,
    /// Declared content type.
    pub content_type: String,
    /// Declared payload length in bytes.
    pub byte_length: u64,
    /// Reader selected for the upload, once the extension was accepted.
    pub format: Option<UploadFormat>,
}

/// Stats reported for accepted uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationStats {
    /// Number of data lines/rows validated.
    pub data_rows: usize,
    /// Buffered payload size.
    pub bytes: usize,
}

/// Observer interface for validation outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ValidationObserver: Send + Sync {
    /// Called when an upload passes every check.
    fn on_accepted(&self, _ctx: &ValidationContext, _stats: ValidationStats) {}

    /// Called when an upload is rejected.
    fn on_rejected(&self, _ctx: &ValidationContext, _severity: ValidationSeverity, _rejection: &Rejection) {}

    /// Called when a rejection meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_rejected`].
    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        self.on_rejected(ctx, severity, rejection)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ValidationObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ValidationObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ValidationObserver for CompositeObserver {
    fn on_accepted(&self, ctx: &ValidationContext, stats: ValidationStats) {
        for o in &self.observers {
            o.on_accepted(ctx, stats);
        }
    }

    fn on_rejected(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        for o in &self.observers {
            o.on_rejected(ctx, severity, rejection);
        }
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        for o in &self.observers {
            o.on_alert(ctx, severity, rejection);
        }
    }
}

/// Emits validation events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ValidationObserver for TracingObserver {
    fn on_accepted(&self, ctx: &ValidationContext, stats: ValidationStats) {
        tracing::info!(
            file = %ctx.file_name,
            format = ?ctx.format,
            rows = stats.data_rows,
            bytes = stats.bytes,
            "upload accepted"
        );
    }

    fn on_rejected(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        tracing::warn!(
            file = %ctx.file_name,
            format = ?ctx.format,
            ?severity,
            row = rejection.row_number(),
            reason = %rejection,
            "upload rejected"
        );
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        tracing::error!(
            file = %ctx.file_name,
            content_type = %ctx.content_type,
            bytes = ctx.byte_length,
            ?severity,
            reason = %rejection,
            "upload rejection alert"
        );
    }
}

/// Appends validation events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ValidationObserver for FileObserver {
    fn on_accepted(&self, ctx: &ValidationContext, stats: ValidationStats) {
        self.append_line(&format!(
            "{} ok format={:?} file={} rows={} bytes={}",
            unix_ts(),
            ctx.format,
            ctx.file_name,
            stats.data_rows,
            stats.bytes
        ));
    }

    fn on_rejected(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        self.append_line(&format!(
            "{} rejected severity={:?} format={:?} file={} reason={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.file_name,
            rejection
        ));
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, rejection: &Rejection) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} file={} reason={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.file_name,
            rejection
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdmissionError, SchemaError};

    #[test]
    fn severity_follows_rejection_kind() {
        let admission = Rejection::from(AdmissionError::NoFile);
        let schema = Rejection::from(SchemaError::Empty);
        let read = Rejection::from(DecodeFault::from(std::io::Error::other("reset")));

        assert_eq!(ValidationSeverity::of(&admission), ValidationSeverity::Warning);
        assert_eq!(ValidationSeverity::of(&schema), ValidationSeverity::Error);
        assert_eq!(ValidationSeverity::of(&read), ValidationSeverity::Critical);
        assert!(ValidationSeverity::Warning < ValidationSeverity::Error);
    }
}
