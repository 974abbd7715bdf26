use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use lane_signal_engine::control_system::signal_allocator::allocate;
use lane_signal_engine::shared_data::{DensityScore, LaneId};

/// Generates dummy scores for a given number of lanes.
/// Every fifth lane repeats a score so the tie-break path is exercised.
fn generate_dummy_scores(lanes: usize) -> Vec<(LaneId, DensityScore)> {
    (0..lanes)
        .map(|i| {
            let value = if i % 5 == 0 { 42.0 } else { 10.0 + ((i * 37) % 90) as f64 * 0.5 };
            (LaneId::new(format!("Lane_{}", i + 1)), DensityScore::new(value))
        })
        .collect()
}

fn bench_allocate(c: &mut Criterion) {
    let lane_counts = [4, 16, 64, 256];

    let mut group = c.benchmark_group("Signal_Allocator_Benchmarks");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &lanes in lane_counts.iter() {
        let scores = generate_dummy_scores(lanes);
        group.bench_with_input(BenchmarkId::new("allocate", lanes), &lanes, |b, &_lanes| {
            b.iter(|| {
                let signals = allocate(black_box(&scores));
                black_box(signals);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocate);
criterion_main!(benches);
