use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use vistim_core::{BarParams, Display, GratingParams, Stimulus, StimulusSpec, Transform};
use vistim_render::{SkiaRenderer, SkiaStimulus, build_stimuli};
use vistim_timing::HighPrecisionTimer;

fn harness() -> (SkiaRenderer, Vec<SkiaStimulus>, Vec<u8>, HighPrecisionTimer) {
    let width = 1280u32;
    let height = 720u32;
    let r = SkiaRenderer::new(width, height, &Display::default(), [0, 0, 0, 255]).expect("canvas");
    let mut stimuli = build_stimuli(&[
        StimulusSpec::Grating(GratingParams::default()),
        StimulusSpec::Bar(BarParams::default()),
    ])
    .expect("stimuli");
    stimuli[0].set_world_transform(Transform::translation(-4.0, 0.0));
    stimuli[1].set_world_transform(Transform::translation(4.0, 0.0));
    stimuli.iter_mut().for_each(|s| s.set_visible(true));
    let fb = vec![0u8; (width * height * 4) as usize];
    let timer = HighPrecisionTimer::new();
    (r, stimuli, fb, timer)
}

pub fn bench_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("grating_and_bar", |b| {
        b.iter_batched(
            harness,
            |(mut r, stimuli, mut fb, mut t)| {
                let stats = r.render_frame(&stimuli, &mut fb, &mut t);
                black_box(stats.is_ok());
            },
            BatchSize::LargeInput,
        )
    });

    g.finish();
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
