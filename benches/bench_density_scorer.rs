use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lane_signal_engine::flow_analyzer::density_scorer::DensityScorer;
use lane_signal_engine::shared_data::LaneReading;
use lane_signal_engine::simulation_engine::profiles::Profile;
use lane_signal_engine::simulation_engine::sample_generator::SampleGenerator;

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("Density_Scorer_Benchmarks");

    for profile in [Profile::basic(), Profile::extended()] {
        let scorer = DensityScorer::for_profile(&profile).deterministic();
        let lanes = profile.lanes.clone();
        let name = profile.name.clone();
        let mut generator = SampleGenerator::seeded(profile, 17);
        let readings: Vec<LaneReading> = (0..100)
            .flat_map(|_| generator.generate(&lanes, None))
            .collect();

        group.bench_with_input(BenchmarkId::new("score", &name), &readings, |b, readings| {
            b.iter(|| {
                for reading in readings {
                    black_box(scorer.score(black_box(reading)));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
