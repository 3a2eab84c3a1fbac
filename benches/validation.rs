use criterion::{black_box, criterion_group, criterion_main, Criterion};

use client_batch_validator::ingestion::text;
use client_batch_validator::validation::RecordValidator;

fn text_payload(rows: usize) -> Vec<u8> {
    let mut out = String::from("Cedula|Nombres|Apellidos|Telefono|Edad\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{:010}|Nombre{i}|Apellido{i}|+593 (2) 555-{:04}|{}\n",
            1_000_000_000 + i,
            i % 10_000,
            i % 151
        ));
    }
    out.into_bytes()
}

fn bench_text(c: &mut Criterion) {
    let validator = RecordValidator::default();
    let payload = text_payload(50_000);

    c.bench_function("text_validate_50k_lines", |b| {
        b.iter(|| {
            let outcome = text::parse_and_validate(black_box(&payload), &validator);
            assert!(outcome.valid);
        })
    });
}

criterion_group!(benches, bench_text);
criterion_main!(benches);
