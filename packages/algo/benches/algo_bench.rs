//! Benchmark suite for recap-algo
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use recap_algo::{select_daily, EntryOrigin, QueueEntry, QuestionType};

fn pending_snapshot(size: i64) -> Vec<QueueEntry> {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    (0..size)
        .map(|i| {
            let question_type = if i % 4 == 0 {
                QuestionType::OpenEnded
            } else {
                QuestionType::SingleSelect
            };
            let origin = if i % 17 == 0 {
                EntryOrigin::SpacedFollowUp
            } else {
                EntryOrigin::Mistake
            };
            QueueEntry::new(
                format!("concept-{}", i % 50),
                "book-1",
                question_type,
                format!("analyze-{}", i % 3),
                origin,
                base + Duration::minutes(i),
            )
        })
        .collect()
}

fn bench_select_daily(c: &mut Criterion) {
    let pending = pending_snapshot(200);
    c.bench_function("select_daily/200", |b| {
        b.iter(|| select_daily(&pending, 3, 1))
    });
}

criterion_group!(benches, bench_select_daily);
criterion_main!(benches);
