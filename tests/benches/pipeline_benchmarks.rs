//! # Pushgate Pipeline Benchmarks
//!
//! | Stage | Target |
//! |-------|--------|
//! | parse | < 50µs per message |
//! | canonical string | < 5µs per message |
//! | RSA-2048 PKCS#1 v1.5 verify | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pg_01_push_verification::test_helpers::{
    notification, sign, signing_certificate, subscription_confirmation, to_body,
    with_signature_version, TEST_SUBSCRIBE_URL, TEST_TOPIC,
};
use pg_01_push_verification::{canonical_string, parse, SignatureVerifier};

// ============================================================================
// PARSING AND CANONICALISATION
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-01-parse");

    for size in [64usize, 4 * 1024, 64 * 1024] {
        let body = to_body(&sign(&notification(TEST_TOPIC, &"x".repeat(size))));
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("notification", size), &body, |b, body| {
            b.iter(|| black_box(parse(body).is_ok()))
        });
    }

    group.finish();
}

fn bench_canonical_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-01-canonical");

    let notification = notification(TEST_TOPIC, "Test message");
    let confirmation = subscription_confirmation(TEST_TOPIC, TEST_SUBSCRIBE_URL);

    group.bench_function("notification", |b| {
        b.iter(|| black_box(canonical_string(&notification)))
    });
    group.bench_function("subscription_confirmation", |b| {
        b.iter(|| black_box(canonical_string(&confirmation)))
    });

    group.finish();
}

// ============================================================================
// SIGNATURE VERIFICATION
// ============================================================================

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("pg-01-verify");

    let verifier = SignatureVerifier::new();
    let certificate = signing_certificate();

    for version in ["1", "2"] {
        let message = sign(&with_signature_version(
            notification(TEST_TOPIC, "Test message"),
            version,
        ));
        group.bench_with_input(
            BenchmarkId::new("signature_version", version),
            &message,
            |b, message| b.iter(|| black_box(verifier.verify(message, &certificate).authentic)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_canonical_string, bench_verify);
criterion_main!(benches);
