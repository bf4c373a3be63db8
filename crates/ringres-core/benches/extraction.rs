//! Benchmarks for the extraction stages
//!
//! Peak detection, per-mode analysis and the full pipeline on synthetic
//! ring spectra of increasing resolution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ringres_core::{
    AnalysisConfig, Extraction, ModeAnalyzer, PeakDetector, Spectrum, SyntheticRing,
};

fn create_spectrum(npoints: usize) -> Spectrum {
    SyntheticRing {
        npoints,
        ..SyntheticRing::fr4()
    }
    .spectrum()
    .unwrap()
}

fn create_config() -> AnalysisConfig {
    AnalysisConfig::new("bench.s2p", SyntheticRing::fr4().geometry).unwrap()
}

fn bench_peak_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("peak_detection");
    let detector = PeakDetector::default();

    for npoints in [1001, 10001, 100001].iter() {
        let spectrum = create_spectrum(*npoints);
        group.bench_with_input(BenchmarkId::from_parameter(npoints), npoints, |b, _| {
            b.iter(|| black_box(detector.detect(&spectrum).count()))
        });
    }

    group.finish();
}

fn bench_mode_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("mode_analysis");
    let config = create_config();
    let analyzer = ModeAnalyzer::from_config(&config);

    for npoints in [1001, 10001, 100001].iter() {
        let spectrum = create_spectrum(*npoints);
        let peaks: Vec<_> = PeakDetector::default().detect(&spectrum).collect();
        group.bench_with_input(BenchmarkId::from_parameter(npoints), npoints, |b, _| {
            b.iter(|| black_box(analyzer.analyze(&spectrum, peaks.iter().copied())))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let config = create_config();

    for npoints in [1001, 10001].iter() {
        let spectrum = create_spectrum(*npoints);
        group.bench_with_input(BenchmarkId::from_parameter(npoints), npoints, |b, _| {
            b.iter(|| black_box(Extraction::from_spectrum(spectrum.clone(), &config)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_peak_detection, bench_mode_analysis, bench_pipeline);
criterion_main!(benches);
