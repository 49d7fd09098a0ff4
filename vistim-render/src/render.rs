use crate::error::RenderError;
use crate::stimulus::SkiaStimulus;
use std::collections::HashMap;
use std::time::Duration;
use tiny_skia::{Color, Pixmap};
use tracing::debug;
use vistim_core::{Display, Transform};
use vistim_timing::{CalibrationStats, HighPrecisionTimer, Timer};

/// Degrees of visual angle to canvas pixels: origin at the canvas center,
/// y up.
pub fn view_transform(display: &Display, width: u32, height: u32) -> Transform {
    let ppd = display.pixels_per_degree();
    Transform {
        a: ppd,
        b: 0.0,
        c: 0.0,
        d: -ppd,
        tx: width as f64 / 2.0,
        ty: height as f64 / 2.0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub drawn: usize,
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    display: Display,
    view: Transform,
    background: Color,
    canvas: Pixmap,

    // Performance tracking
    component_timers: HashMap<&'static str, HighPrecisionTimer>,
}

impl SkiaRenderer {
    pub fn new(
        width: u32,
        height: u32,
        display: &Display,
        background: [u8; 4],
    ) -> Result<Self, RenderError> {
        let canvas = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        // The canvas stays opaque so premultiplied bytes copy straight into the frame.
        let [r, g, b, _] = background;
        let renderer = SkiaRenderer {
            width,
            height,
            display: *display,
            view: view_transform(display, width, height),
            background: Color::from_rgba8(r, g, b, 255),
            canvas,
            component_timers: ["clear", "draw", "copy"]
                .iter()
                .map(|&k| (k, HighPrecisionTimer::new()))
                .collect(),
        };
        debug!(
            width,
            height,
            ppd = renderer.display.pixels_per_degree(),
            "renderer ready"
        );
        Ok(renderer)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), RenderError> {
        self.canvas = Pixmap::new(new_width, new_height).ok_or(RenderError::Canvas {
            width: new_width,
            height: new_height,
        })?;
        self.width = new_width;
        self.height = new_height;
        self.view = view_transform(&self.display, new_width, new_height);
        debug!(width = new_width, height = new_height, "canvas resized");
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn view(&self) -> Transform {
        self.view
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Clears to the background and draws every visible stimulus in order.
    pub fn draw(&mut self, stimuli: &[SkiaStimulus]) -> usize {
        self.canvas.fill(self.background);
        self.draw_visible(stimuli)
    }

    fn draw_visible(&mut self, stimuli: &[SkiaStimulus]) -> usize {
        let mut drawn = 0;
        for s in stimuli.iter().filter(|s| s.is_visible()) {
            s.draw(&mut self.canvas, &self.view);
            drawn += 1;
        }
        drawn
    }

    pub fn render_frame<T: Timer>(
        &mut self,
        stimuli: &[SkiaStimulus],
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats, RenderError> {
        let expected = self.canvas.data().len();
        if frame_buffer.len() != expected {
            return Err(RenderError::FrameSize {
                expected,
                actual: frame_buffer.len(),
            });
        }

        let t_clear = {
            let t = timer.now();
            self.canvas.fill(self.background);
            timer.elapsed(t)
        };
        let (t_draw, drawn) = {
            let t = timer.now();
            let drawn = self.draw_visible(stimuli);
            (timer.elapsed(t), drawn)
        };
        let t_copy = {
            let t = timer.now();
            frame_buffer.copy_from_slice(self.canvas.data());
            timer.elapsed(t)
        };

        let total = t_clear + t_draw + t_copy;
        self.record("clear", t_clear);
        self.record("draw", t_draw);
        self.record("copy", t_copy);
        timer.record_frame(total);

        Ok(FrameStats {
            clear: t_clear,
            draw: t_draw,
            copy: t_copy,
            total,
            drawn,
        })
    }

    fn record(&mut self, component: &'static str, d: Duration) {
        if let Some(t) = self.component_timers.get_mut(component) {
            t.record_frame(d);
        }
    }

    /// Frame time statistics for `clear`, `draw` or `copy`.
    pub fn component_stats(&self, component: &str) -> Option<CalibrationStats> {
        self.component_timers
            .get(component)
            .map(|t| t.calibration_stats())
    }
}
