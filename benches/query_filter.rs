use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use varuna_lens::aggregation::summarize;
use varuna_lens::query::{
    filter_measurements, DepthRange, MeasurementQuery, SpatialBounds, TemporalBounds,
};
use varuna_lens::source::{MeasurementSource, SampleDataGenerator};
use varuna_lens::types::{ParameterName, QualityFlag};

fn full_query() -> MeasurementQuery {
    let now = Utc::now();
    MeasurementQuery::new()
        .with_spatial_bounds(SpatialBounds::new(25.0, 8.0, 78.0, 60.0))
        .with_temporal_bounds(TemporalBounds::new(now - Duration::days(15), now))
        .with_depth_range(DepthRange::new(0.0, 200.0))
        .with_quality_threshold(QualityFlag::ProbablyGood)
        .with_required_parameters(vec![ParameterName::Temperature, ParameterName::Salinity])
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [500, 5_000, 50_000].iter() {
        let batch = SampleDataGenerator::with_seed(42).generate_measurements(*size);
        let empty = MeasurementQuery::new();
        let full = full_query();

        group.bench_with_input(BenchmarkId::new("pass_through", size), size, |b, _| {
            b.iter(|| black_box(filter_measurements(&empty, &batch)))
        });
        group.bench_with_input(BenchmarkId::new("all_predicates", size), size, |b, _| {
            b.iter(|| black_box(filter_measurements(&full, &batch)))
        });
    }

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for size in [500, 5_000, 50_000].iter() {
        let batch = SampleDataGenerator::with_seed(42).generate_measurements(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(summarize(&batch)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_summarize);
criterion_main!(benches);
