use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pprof::criterion::{Output, PProfProfiler};
use std::time::Duration;

use vistim_core::{BarParams, Display, GratingParams, GratingType, Stimulus, StimulusSpec, Transform};
use vistim_render::{SkiaRenderer, SkiaStimulus};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn prepare(spec: StimulusSpec) -> (SkiaRenderer, Vec<SkiaStimulus>) {
    let r = SkiaRenderer::new(WIDTH, HEIGHT, &Display::default(), [0, 0, 0, 255])
        .expect("canvas");
    let mut s = SkiaStimulus::new(&spec).expect("stimulus");
    s.set_visible(true);
    (r, vec![s])
}

/// Bar fill at a few orientations; rotated bars take the anti-aliased edge path.
pub fn bench_bar(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar");
    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    for degrees in [0.0, 30.0, 90.0] {
        group.bench_with_input(BenchmarkId::new("rotated", degrees), &degrees, |b, &deg| {
            let (mut r, mut stimuli) = prepare(StimulusSpec::Bar(BarParams::default()));
            stimuli[0].set_world_transform(Transform::rotation_degrees(deg));
            b.iter(|| black_box(r.draw(black_box(&stimuli))));
        });
    }

    group.finish();
}

/// Per-pixel grating shading, scaled by aperture area.
pub fn bench_grating(c: &mut Criterion) {
    let mut group = c.benchmark_group("grating");
    group
        .sample_size(30)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    for diameter in [2.0f32, 5.0, 10.0] {
        group.bench_with_input(
            BenchmarkId::new("sinusoidal", diameter),
            &diameter,
            |b, &diameter| {
                let (mut r, mut stimuli) = prepare(StimulusSpec::Grating(GratingParams {
                    diameter,
                    ..GratingParams::default()
                }));
                let mut t = 0.0;
                b.iter(|| {
                    t += 1.0 / 120.0;
                    stimuli[0].set_temporal_phase(t);
                    black_box(r.draw(&stimuli))
                });
            },
        );
    }

    group.bench_function("square_10deg", |b| {
        let (mut r, stimuli) = prepare(StimulusSpec::Grating(GratingParams {
            grating_type: GratingType::Square,
            diameter: 10.0,
            ..GratingParams::default()
        }));
        b.iter(|| black_box(r.draw(&stimuli)));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
        .confidence_level(0.95)
        .noise_threshold(0.02)
        .significance_level(0.05);
    targets = bench_bar, bench_grating
}

criterion_main!(benches);
