use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use client_batch_validator::ingestion::{
    CompositeObserver, FileObserver, GateOptions, IngestionGate, TracingObserver, UploadFormat, ValidationContext,
    ValidationObserver, ValidationSeverity, ValidationStats,
};
use client_batch_validator::{logging, Rejection};

const VALID_TXT: &str = "Cedula|Nombres|Apellidos|Telefono|Edad\n123456|Ana|Lopez|5551234|30\n654321|Luis|Mora|5559876|41";

#[derive(Default)]
struct RecordingObserver {
    accepted: Mutex<Vec<(Option<UploadFormat>, ValidationStats)>>,
    rejected: Mutex<Vec<ValidationSeverity>>,
    alerts: Mutex<Vec<ValidationSeverity>>,
}

impl ValidationObserver for RecordingObserver {
    fn on_accepted(&self, ctx: &ValidationContext, stats: ValidationStats) {
        self.accepted.lock().unwrap().push((ctx.format, stats));
    }

    fn on_rejected(&self, _ctx: &ValidationContext, severity: ValidationSeverity, _rejection: &Rejection) {
        self.rejected.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &ValidationContext, severity: ValidationSeverity, _rejection: &Rejection) {
        self.alerts.lock().unwrap().push(severity);
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk unplugged"))
    }
}

fn gate_with(obs: Arc<dyn ValidationObserver>, alert_at_or_above: ValidationSeverity) -> IngestionGate {
    IngestionGate::new(GateOptions {
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    })
}

#[test]
fn observer_receives_accepted_upload_stats() {
    let obs = Arc::new(RecordingObserver::default());
    let gate = gate_with(obs.clone(), ValidationSeverity::Critical);

    let outcome = gate.admit("clientes.txt", "text/plain", VALID_TXT.len() as u64, Some(VALID_TXT.as_bytes()));
    assert!(outcome.valid);

    let accepted = obs.accepted.lock().unwrap().clone();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].0, Some(UploadFormat::Text));
    assert_eq!(
        accepted[0].1,
        ValidationStats {
            data_rows: 2,
            bytes: VALID_TXT.len(),
        }
    );
    assert!(obs.rejected.lock().unwrap().is_empty());
}

#[test]
fn admission_rejection_is_a_warning_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let gate = gate_with(obs.clone(), ValidationSeverity::Critical);

    let _ = gate.admit("clientes.pdf", "application/pdf", 3, Some(&b"abc"[..]));

    assert_eq!(*obs.rejected.lock().unwrap(), vec![ValidationSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn row_rejection_alerts_when_threshold_is_error() {
    let obs = Arc::new(RecordingObserver::default());
    let gate = gate_with(obs.clone(), ValidationSeverity::Error);

    let payload = "Cedula|Nombres|Apellidos|Telefono|Edad\n123456|Ana|Lopez|abc#|30";
    let _ = gate.admit("clientes.txt", "text/plain", payload.len() as u64, Some(payload.as_bytes()));

    assert_eq!(*obs.rejected.lock().unwrap(), vec![ValidationSeverity::Error]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![ValidationSeverity::Error]);
}

#[test]
fn read_failure_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let gate = gate_with(obs.clone(), ValidationSeverity::Critical);

    let _ = gate.admit("clientes.txt", "text/plain", 10, Some(FailingReader));

    assert_eq!(*obs.rejected.lock().unwrap(), vec![ValidationSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![ValidationSeverity::Critical]);
}

#[test]
fn composite_fans_out_and_file_observer_appends() {
    logging::init_test();

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("uploads.log");
    let recording = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        recording.clone(),
        Arc::new(FileObserver::new(&log_path)),
        Arc::new(TracingObserver),
    ]);
    let gate = gate_with(Arc::new(composite), ValidationSeverity::Critical);

    let _ = gate.admit("clientes.txt", "text/plain", VALID_TXT.len() as u64, Some(VALID_TXT.as_bytes()));
    let _ = gate.admit("clientes.txt", "text/plain", 0, Some(&b""[..]));

    assert_eq!(recording.accepted.lock().unwrap().len(), 1);
    assert_eq!(recording.rejected.lock().unwrap().len(), 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" ok format=Some(Text) file=clientes.txt rows=2"));
    assert!(lines[1].contains(" rejected severity=Warning"));
    assert!(lines[1].contains("reason=no file received"));
}
