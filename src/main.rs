use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;

use client_batch_validator::error::{DecodeFault, Rejection};
use client_batch_validator::ingestion::{
    AdmissionPolicy, CompositeObserver, FileObserver, GateOptions, IngestionGate, TracingObserver, UploadFormat,
    ValidationObserver,
};
use client_batch_validator::{logging, ValidationOutcome};

/// Validate client-record batch files (.txt / .xlsx) before upload.
#[derive(Debug, Parser)]
#[command(name = "client-batch-validator", version, about)]
struct Cli {
    /// Files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON file with an admission policy (`allowed_extensions`, `max_bytes`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the size ceiling in bytes.
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Append one line per validated file to this log.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print one JSON object per file instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    #[serde(flatten)]
    outcome: &'a ValidationOutcome,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let mut policy = match cli.config.as_deref().map(AdmissionPolicy::from_json_path).transpose() {
        Ok(policy) => policy.unwrap_or_default(),
        Err(e) => {
            eprintln!("error: cannot load {}: {e}", cli.config.as_deref().unwrap_or(Path::new("")).display());
            return ExitCode::from(2);
        }
    };
    if let Some(max_bytes) = cli.max_bytes {
        policy.max_bytes = max_bytes;
    }

    let mut observers: Vec<Arc<dyn ValidationObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = cli.log_file.as_ref() {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    let gate = IngestionGate::new(GateOptions {
        policy,
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    });

    let outcomes: Vec<ValidationOutcome> = cli.files.par_iter().map(|path| validate_path(&gate, path)).collect();

    let mut all_valid = true;
    for (path, outcome) in cli.files.iter().zip(&outcomes) {
        all_valid &= outcome.valid;
        if cli.json {
            let report = FileReport { file: path, outcome };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("error: cannot serialize result for {}: {e}", path.display()),
            }
        } else {
            let status = if outcome.valid { "ok" } else { "FAIL" };
            println!("{status:<4} {}: {}", path.display(), outcome.reason);
        }
    }

    if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn validate_path(gate: &IngestionGate, path: &Path) -> ValidationOutcome {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let opened = File::open(path).and_then(|f| f.metadata().map(|m| (f, m.len())));
    match opened {
        Ok((file, len)) => gate.admit(&file_name, content_type_for(&file_name), len, Some(file)),
        Err(e) => Rejection::from(DecodeFault::from(e)).to_outcome(),
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match UploadFormat::from_extension(ext) {
        Some(UploadFormat::Text) => "text/plain",
        Some(UploadFormat::Spreadsheet) => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        None => "application/octet-stream",
    }
}
