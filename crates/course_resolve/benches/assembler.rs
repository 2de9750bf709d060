mod common;

use std::hint::black_box;

use course_resolve::prelude::{apply_grade, assemble, compute_grade};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn assemble_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("course/assemble");

    for &n in &[4usize, 32, 128, 512] {
        let segments = common::shuffled_course(n, 20.0, 0xC0FFEE);
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let course = assemble(black_box(&segments));
                black_box(course);
            });
        });
    }

    group.finish();
}

fn grade_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("course/apply_grade");

    for &n in &[4usize, 32, 128, 512] {
        let segments = common::shuffled_course(n, 20.0, 0xFACEFEED);
        let Some(chain) = assemble(&segments).primary else {
            continue;
        };
        group.throughput(common::elements_throughput(n));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter_batched(
                || chain.clone(),
                |mut chain| {
                    if let Some(grade) = compute_grade(&chain) {
                        apply_grade(&mut chain, grade);
                    }
                    black_box(chain);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = assemble_benches, grade_benches
}
criterion_main!(benches);
