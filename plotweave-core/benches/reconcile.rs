use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use plotweave_core::animation::Stage;
use plotweave_core::glyphs::PointGlyph;
use plotweave_core::join::{Durations, Point2, Reconciler, RenderArgs};
use plotweave_core::scale::LinearScale;

fn points(n: usize, offset: usize, shift: f64) -> Vec<Point2<usize>> {
    (offset..offset + n)
        .map(|k| Point2::new(k, k as f64 * 0.01 + shift, (k as f64).sin()))
        .collect()
}

/// A stage with `n` points already on screen.
fn populated(n: usize) -> (Stage, Reconciler<usize>) {
    let mut stage = Stage::new();
    let root = stage.surface().root();
    let layer = stage.surface_mut().append(root, "g").expect("root is attached");
    let mut reconciler = Reconciler::new(layer);
    let scale = LinearScale::new().with_domain([0.0, n as f64 * 0.01]).with_range([0.0, 500.0]);
    let args = RenderArgs::new(&scale, &scale, Durations::instant());
    reconciler.reconcile(&mut stage, &points(n, 0, 0.0), &PointGlyph::default(), &args);
    (stage, reconciler)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for &n in &[10usize, 100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));

        // All keys survive and move.
        let moved = points(n, 0, 0.5);
        group.bench_with_input(BenchmarkId::new("update", n), &n, |b, &n| {
            b.iter_batched(
                || populated(n),
                |(mut stage, mut reconciler)| {
                    let scale = LinearScale::new().with_range([0.0, 500.0]);
                    let args = RenderArgs::new(&scale, &scale, Durations::default());
                    let glyph = PointGlyph::default();
                    black_box(reconciler.reconcile(&mut stage, &moved, &glyph, &args));
                },
                BatchSize::LargeInput,
            )
        });

        // Half the keys are replaced.
        let churned = points(n, n / 2, 0.0);
        group.bench_with_input(BenchmarkId::new("churn", n), &n, |b, &n| {
            b.iter_batched(
                || populated(n),
                |(mut stage, mut reconciler)| {
                    let scale = LinearScale::new().with_range([0.0, 500.0]);
                    let args = RenderArgs::new(&scale, &scale, Durations::default());
                    let glyph = PointGlyph::default();
                    black_box(reconciler.reconcile(&mut stage, &churned, &glyph, &args));
                    stage.run_until_idle();
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
