//! Benchmarks for gap buffer operations.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gapmacs_buffer::Buffer;

/// Generates a large text string for benchmarking.
fn generate_large_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {}: This is a sample line of text for benchmarking purposes.\n", i))
        .collect()
}

/// Benchmarks buffer creation.
fn bench_buffer_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_creation");

    for size in [100, 1000, 10000, 100000].iter() {
        let text = generate_large_text(*size);

        group.bench_with_input(BenchmarkId::new("from_string", size), &text, |b, text| {
            b.iter(|| {
                let buffer = Buffer::from(black_box(text.as_str()));
                black_box(buffer)
            })
        });
    }

    group.finish();
}

/// Benchmarks insertion near point and after a long jump.
fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");

    let base_text = generate_large_text(10000);

    group.bench_function("typing_at_point", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                for _ in 0..100 {
                    buffer.insert(black_box("x"));
                }
                black_box(buffer)
            },
        )
    });

    group.bench_function("insert_at_middle", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                buffer.goto_line(5000);
                buffer.insert(black_box("inserted text"));
                black_box(buffer)
            },
        )
    });

    group.bench_function("insert_at_end", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                buffer.end_of_buffer();
                buffer.insert(black_box("inserted text"));
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks deletion around point.
fn bench_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("deletion");

    let base_text = generate_large_text(10000);

    group.bench_function("delete_forward", |b| {
        b.iter_with_setup(
            || Buffer::from(base_text.as_str()),
            |mut buffer| {
                buffer.goto_line(5000);
                buffer.delete_char(black_box(10)).ok();
                black_box(buffer)
            },
        )
    });

    group.bench_function("backward_delete", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::from(base_text.as_str());
                buffer.goto_line(5000);
                buffer
            },
            |mut buffer| {
                for _ in 0..50 {
                    buffer.backward_delete_char(1).ok();
                }
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks undo/redo.
fn bench_undo_redo(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo");

    group.bench_function("undo_100_edits", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::new();
                for i in 0..100 {
                    buffer.insert(&format!("Edit {}\n", i));
                }
                buffer
            },
            |mut buffer| {
                for _ in 0..100 {
                    buffer.undo().ok();
                }
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks line motion with a sticky goal column.
fn bench_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion");

    let text = generate_large_text(10000);

    group.bench_function("next_line_x1000", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::from(text.as_str());
                buffer.forward_char(20).ok();
                buffer
            },
            |mut buffer| {
                buffer.next_line(black_box(1000));
                black_box(buffer.point())
            },
        )
    });

    group.bench_function("goto_char_far", |b| {
        b.iter_with_setup(
            || Buffer::from(text.as_str()),
            |mut buffer| {
                let end = buffer.point_max();
                buffer.goto_char(black_box(end)).ok();
                buffer.goto_char(0).ok();
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks regex search across the gap.
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let text = generate_large_text(10000);

    group.bench_function("re_search_forward", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = Buffer::from(text.as_str());
                buffer.goto_line(100);
                buffer.insert("x");
                buffer.beginning_of_buffer();
                buffer
            },
            |mut buffer| black_box(buffer.re_search_forward(black_box("Line 9999:")).ok()),
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_buffer_creation,
    bench_insertion,
    bench_deletion,
    bench_undo_redo,
    bench_motion,
    bench_search,
);
criterion_main!(benches);
