//! Upload admission and dispatch.
//!
//! Most callers should build one [`IngestionGate`] at startup and call [`IngestionGate::admit`]
//! for every upload:
//!
//! - presence, extension and size are checked against the [`AdmissionPolicy`] before any byte is
//!   parsed
//! - the payload is buffered once, then handed to the text or spreadsheet reader chosen by
//!   extension
//! - if an [`super::observability::ValidationObserver`] is configured, acceptances, rejections
//!   and alerts are reported to it

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AdmissionError, ConfigError, DecodeFault, Rejection, ValidationResult};
use crate::types::ValidationOutcome;
use crate::validation::RecordValidator;

use super::observability::{ValidationContext, ValidationObserver, ValidationSeverity, ValidationStats};
use super::{excel, text};

/// Upload formats with a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Pipe-delimited text (`.txt`).
    Text,
    /// Excel workbook (`.xlsx`).
    Spreadsheet,
}

impl UploadFormat {
    /// Parse an upload format from a file extension (case-insensitive, leading dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match normalize_extension(ext).as_str() {
            ".txt" => Some(Self::Text),
            ".xlsx" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Admission limits applied before parsing.
///
/// Deserializes from JSON; missing keys keep their defaults.
///
/// ```rust
/// use client_batch_validator::ingestion::AdmissionPolicy;
///
/// let policy = AdmissionPolicy::from_json_str(r#"{ "max_bytes": 1048576 }"#).unwrap();
/// assert_eq!(policy.max_bytes, 1024 * 1024);
/// assert!(policy.allows(".TXT"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdmissionPolicy {
    /// Accepted extensions, with leading dot. Compared case-insensitively.
    pub allowed_extensions: Vec<String>,
    /// Size ceiling in bytes (inclusive).
    pub max_bytes: u64,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".xlsx".to_string(), ".txt".to_string()],
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AdmissionPolicy {
    /// Parse a policy from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a policy from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns true if `ext` is in the allow-list.
    pub fn allows(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.allowed_extensions
            .iter()
            .any(|allowed| normalize_extension(allowed) == ext)
    }

    fn allowed_list(&self) -> String {
        self.allowed_extensions.join(" or ")
    }
}

/// Options controlling the gate.
///
/// Use [`Default`] for the standard 5 MB `.xlsx`/`.txt` policy without an observer.
#[derive(Clone)]
pub struct GateOptions {
    /// Presence/extension/size limits.
    pub policy: AdmissionPolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ValidationObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ValidationSeverity,
}

impl fmt::Debug for GateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateOptions")
            .field("policy", &self.policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            policy: AdmissionPolicy::default(),
            observer: None,
            alert_at_or_above: ValidationSeverity::Critical,
        }
    }
}

/// Outcome of [`IngestionGate::admit_with_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    /// What the reader (or admission) concluded.
    pub outcome: ValidationOutcome,
    /// The buffered payload, present only when the upload was accepted.
    pub payload: Option<Vec<u8>>,
}

impl GateDecision {
    /// The bytes to forward downstream, if the upload was accepted.
    pub fn accepted_payload(self) -> Option<Vec<u8>> {
        if self.outcome.valid { self.payload } else { None }
    }
}

/// Validates uploads. Build once and share; it holds no per-upload state.
#[derive(Debug, Clone)]
pub struct IngestionGate {
    options: GateOptions,
    validator: RecordValidator,
}

impl IngestionGate {
    /// Create a gate for the client schema.
    pub fn new(options: GateOptions) -> Self {
        Self::with_validator(options, RecordValidator::default())
    }

    /// Create a gate with an explicit record validator.
    pub fn with_validator(options: GateOptions, validator: RecordValidator) -> Self {
        Self { options, validator }
    }

    /// Admission policy in effect.
    pub fn policy(&self) -> &AdmissionPolicy {
        &self.options.policy
    }

    /// Validate one upload.
    ///
    /// `byte_length` is the declared size; `stream` is `None` when no file was attached.
    ///
    /// Rejections, in order: no file / zero length, extension not allowed, declared size above
    /// the ceiling. Accepted uploads are buffered (never more than `max_bytes + 1` bytes are
    /// read) and validated by the reader for their extension, whose outcome is returned as-is.
    ///
    /// ```rust
    /// use client_batch_validator::ingestion::{GateOptions, IngestionGate};
    ///
    /// let gate = IngestionGate::new(GateOptions::default());
    ///
    /// let ok = "Cedula|Nombres|Apellidos|Telefono|Edad\n123456|Ana|Lopez|5551234|30";
    /// let outcome = gate.admit("clientes.txt", "text/plain", ok.len() as u64, Some(ok.as_bytes()));
    /// assert!(outcome.valid);
    ///
    /// let outcome = gate.admit("clientes.csv", "text/csv", ok.len() as u64, Some(ok.as_bytes()));
    /// assert!(!outcome.valid);
    /// assert!(outcome.reason.contains("unsupported extension"));
    /// ```
    pub fn admit<R: Read>(
        &self,
        file_name: &str,
        content_type: &str,
        byte_length: u64,
        stream: Option<R>,
    ) -> ValidationOutcome {
        self.admit_with_payload(file_name, content_type, byte_length, stream)
            .outcome
    }

    /// Like [`Self::admit`], but also hands back the buffered bytes so an accepted upload can be
    /// forwarded without reading the stream again.
    pub fn admit_with_payload<R: Read>(
        &self,
        file_name: &str,
        content_type: &str,
        byte_length: u64,
        stream: Option<R>,
    ) -> GateDecision {
        let mut ctx = ValidationContext {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            byte_length,
            format: None,
        };

        let result = self.screen(&mut ctx, stream);

        match result {
            Ok((payload, data_rows)) => {
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_accepted(
                        &ctx,
                        ValidationStats {
                            data_rows,
                            bytes: payload.len(),
                        },
                    );
                }
                GateDecision {
                    outcome: ValidationOutcome::success(),
                    payload: Some(payload),
                }
            }
            Err(rejection) => {
                if let Some(obs) = self.options.observer.as_ref() {
                    let sev = ValidationSeverity::of(&rejection);
                    obs.on_rejected(&ctx, sev, &rejection);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, &rejection);
                    }
                }
                GateDecision {
                    outcome: rejection.to_outcome(),
                    payload: None,
                }
            }
        }
    }

    fn screen<R: Read>(
        &self,
        ctx: &mut ValidationContext,
        stream: Option<R>,
    ) -> ValidationResult<(Vec<u8>, usize)> {
        let policy = &self.options.policy;

        let stream = match stream {
            Some(s) if ctx.byte_length > 0 => s,
            _ => return Err(AdmissionError::NoFile.into()),
        };

        let ext = extension_of(&ctx.file_name);
        let unsupported = || AdmissionError::UnsupportedExtension {
            extension: ext.clone(),
            allowed: policy.allowed_list(),
        };
        if !policy.allows(&ext) {
            return Err(unsupported().into());
        }
        let format = UploadFormat::from_extension(&ext).ok_or_else(unsupported)?;
        ctx.format = Some(format);

        if ctx.byte_length > policy.max_bytes {
            return Err(AdmissionError::TooLarge {
                max_bytes: policy.max_bytes,
                found_bytes: ctx.byte_length,
            }
            .into());
        }

        let payload = buffer_payload(stream, ctx.byte_length, policy.max_bytes)?;
        tracing::debug!(
            file = %ctx.file_name,
            ?format,
            bytes = payload.len(),
            "dispatching upload to reader"
        );

        let data_rows = match format {
            UploadFormat::Text => text::validate_text(&payload, &self.validator)?,
            UploadFormat::Spreadsheet => excel::validate_workbook(&payload, &self.validator)?,
        };
        Ok((payload, data_rows))
    }
}

/// Read the whole stream, never holding more than `max_bytes + 1` bytes.
fn buffer_payload<R: Read>(stream: R, declared: u64, max_bytes: u64) -> ValidationResult<Vec<u8>> {
    let capacity = declared.min(max_bytes).try_into().unwrap_or(0usize);
    let mut payload = Vec::with_capacity(capacity);
    stream
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut payload)
        .map_err(|e| Rejection::from(DecodeFault::from(e)))?;

    if payload.is_empty() {
        return Err(AdmissionError::NoFile.into());
    }
    let found = payload.len() as u64;
    if found > max_bytes {
        return Err(AdmissionError::TooLarge {
            max_bytes,
            found_bytes: found,
        }
        .into());
    }
    Ok(payload)
}

/// Extension of a file name, lowercased, with leading dot (`""` when absent).
///
/// Everything from the last `.` of the final path component counts, so a bare `".txt"` has
/// extension `.txt` and a trailing dot has none.
fn extension_of(file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => name[dot..].to_lowercase(),
        _ => String::new(),
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
