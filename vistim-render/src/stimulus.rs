use crate::error::RenderError;
use std::f64::consts::TAU;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8, Rect};
use tracing::warn;
use vistim_core::{
    BarParams, GratingParams, GratingType, Stimulus, StimulusSpec, StimulusState, Transform,
};

pub(crate) fn to_skia(m: &Transform) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(
        m.a as f32,
        m.b as f32,
        m.c as f32,
        m.d as f32,
        m.tx as f32,
        m.ty as f32,
    )
}

/// Filled rectangle, `width` along the local x axis, centered on the local
/// origin.
#[derive(Debug, Clone)]
pub struct SkiaBar {
    params: BarParams,
    path: Path,
    paint: Paint<'static>,
    state: StimulusState,
}

impl SkiaBar {
    pub fn new(params: BarParams) -> Result<Self, RenderError> {
        let (w, h) = (params.width, params.height);
        let empty = RenderError::EmptyBar {
            width: w,
            height: h,
        };
        if !(w > 0.0 && h > 0.0) {
            return Err(empty);
        }
        let rect = Rect::from_xywh(-w / 2.0, -h / 2.0, w, h).ok_or(empty)?;
        let [r, g, b, a] = params.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        Ok(Self {
            params,
            path: PathBuilder::from_rect(rect),
            paint,
            state: StimulusState::default(),
        })
    }

    pub fn params(&self) -> &BarParams {
        &self.params
    }

    pub fn draw(&self, canvas: &mut Pixmap, view: &Transform) {
        let full = self.state.orientation.then(self.state.world).then(*view);
        canvas.fill_path(
            &self.path,
            &self.paint,
            FillRule::Winding,
            to_skia(&full),
            None,
        );
    }
}

/// Grating inside a circular aperture, shaded per pixel. Bars drift along the
/// local x axis.
#[derive(Debug, Clone)]
pub struct SkiaGrating {
    params: GratingParams,
    state: StimulusState,
}

impl SkiaGrating {
    pub fn new(params: GratingParams) -> Result<Self, RenderError> {
        if !(params.diameter > 0.0) {
            return Err(RenderError::EmptyAperture(params.diameter));
        }
        Ok(Self {
            params,
            state: StimulusState::default(),
        })
    }

    pub fn params(&self) -> &GratingParams {
        &self.params
    }

    /// Luminance in `0..=1` at `x` degrees along the drift axis.
    pub fn intensity(&self, x: f64) -> f64 {
        let g = &self.params;
        let cycles = g.sf as f64 * x - g.tf as f64 * self.state.temporal_phase
            + g.spatial_phase as f64;
        let wave = match g.grating_type {
            GratingType::Sinusoidal => (TAU * cycles).sin(),
            GratingType::Square => {
                if cycles.rem_euclid(1.0) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            GratingType::Linear => 2.0 * cycles.rem_euclid(1.0) - 1.0,
        };
        (g.luminance as f64 * (1.0 + g.contrast as f64 * wave)).clamp(0.0, 1.0)
    }

    pub fn draw(&self, canvas: &mut Pixmap, view: &Transform) {
        let full = self.state.orientation.then(self.state.world).then(*view);
        let Some(to_local) = full.inverse() else {
            warn!("grating transform is singular; skipping draw");
            return;
        };

        let radius = self.params.diameter as f64 / 2.0;
        let (cx, cy) = full.origin();
        let reach = radius * (full.a * full.d - full.b * full.c).abs().sqrt();
        let (w, h) = (canvas.width() as i64, canvas.height() as i64);
        let x0 = ((cx - reach).floor() as i64).clamp(0, w);
        let x1 = ((cx + reach).ceil() as i64).clamp(0, w);
        let y0 = ((cy - reach).floor() as i64).clamp(0, h);
        let y1 = ((cy + reach).ceil() as i64).clamp(0, h);

        let stride = canvas.width() as usize;
        let pixels = canvas.pixels_mut();
        let r2 = radius * radius;
        for py in y0..y1 {
            for px in x0..x1 {
                let (lx, ly) = to_local.apply((px as f64 + 0.5, py as f64 + 0.5));
                if lx * lx + ly * ly > r2 {
                    continue;
                }
                let color = mix(
                    self.params.low_color,
                    self.params.high_color,
                    self.intensity(lx),
                );
                let i = py as usize * stride + px as usize;
                pixels[i] = blend(pixels[i], color);
            }
        }
    }
}

fn mix(low: [u8; 4], high: [u8; 4], k: f64) -> [u8; 4] {
    std::array::from_fn(|i| {
        let (l, h) = (low[i] as f64, high[i] as f64);
        (l + (h - l) * k).round().clamp(0.0, 255.0) as u8
    })
}

// Source-over onto a premultiplied destination.
fn blend(dst: PremultipliedColorU8, [r, g, b, a]: [u8; 4]) -> PremultipliedColorU8 {
    let sa = a as u32;
    let inv = 255 - sa;
    let alpha = (sa + (dst.alpha() as u32 * inv + 127) / 255) as u8;
    let over = |s: u8, d: u8| (((s as u32 * sa + d as u32 * inv + 127) / 255) as u8).min(alpha);
    PremultipliedColorU8::from_rgba(
        over(r, dst.red()),
        over(g, dst.green()),
        over(b, dst.blue()),
        alpha,
    )
    .unwrap_or(dst)
}

/// Backend stimulus the flow drives through [`Stimulus`].
#[derive(Debug, Clone)]
pub enum SkiaStimulus {
    Bar(SkiaBar),
    Grating(SkiaGrating),
}

impl SkiaStimulus {
    pub fn new(spec: &StimulusSpec) -> Result<Self, RenderError> {
        match spec {
            StimulusSpec::Bar(bar) => SkiaBar::new(*bar).map(SkiaStimulus::Bar),
            StimulusSpec::Grating(grating) => SkiaGrating::new(*grating).map(SkiaStimulus::Grating),
        }
    }

    pub fn draw(&self, canvas: &mut Pixmap, view: &Transform) {
        match self {
            SkiaStimulus::Bar(bar) => bar.draw(canvas, view),
            SkiaStimulus::Grating(grating) => grating.draw(canvas, view),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    fn state_mut(&mut self) -> &mut StimulusState {
        match self {
            SkiaStimulus::Bar(bar) => &mut bar.state,
            SkiaStimulus::Grating(grating) => &mut grating.state,
        }
    }
}

impl Stimulus for SkiaStimulus {
    fn set_world_transform(&mut self, world: Transform) {
        self.state_mut().world = world;
    }

    fn set_orientation_transform(&mut self, orientation: Transform) {
        self.state_mut().orientation = orientation;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state_mut().visible = visible;
    }

    fn set_temporal_phase(&mut self, seconds: f64) {
        self.state_mut().temporal_phase = seconds;
    }

    fn state(&self) -> &StimulusState {
        match self {
            SkiaStimulus::Bar(bar) => &bar.state,
            SkiaStimulus::Grating(grating) => &grating.state,
        }
    }
}

/// One backend stimulus per spec, in order. Any failure aborts the whole set.
pub fn build_stimuli(specs: &[StimulusSpec]) -> Result<Vec<SkiaStimulus>, RenderError> {
    specs.iter().map(SkiaStimulus::new).collect()
}
