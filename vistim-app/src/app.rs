use anyhow::{Context, Result};
use pixels::{Pixels, SurfaceTexture};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, trace, warn};
use vistim_experiment::{ExperimentConfig, ExperimentFlow, Kinematics, StimulusProgram};
use vistim_marker::{MarkerChannel, MarkerPort};
use vistim_render::{FrameStats, SkiaRenderer, SkiaStimulus, build_stimuli};
use vistim_timing::{HighPrecisionTimer, Timer};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

const LOG_PATH: &str = "presentation_log.json";

type Flow = ExperimentFlow<StimulusProgram, HighPrecisionTimer, Box<dyn MarkerPort>>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    flow: Flow,
    stimuli: Vec<SkiaStimulus>,
    background: [u8; 4],
    refresh_rate: Option<f64>,

    started: bool,
    saved: bool,
    should_exit: bool,
}

impl App {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = match &config_path {
            Some(path) => ExperimentConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                info!("no config given, running the default drifting bar");
                ExperimentConfig::default()
            }
        };
        let warnings = config.sanitize();
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "config was sanitized");
        }

        let stimuli = build_stimuli(&config.program.stimulus_specs())
            .context("constructing stimuli")?;

        let markers = match config.marker.open() {
            Ok(port) => MarkerChannel::new(port),
            Err(e) => MarkerChannel::degraded(&e),
        };

        let condition = config.condition();
        let mut flow = ExperimentFlow::new(
            config.program,
            config.design.clone(),
            condition,
            config.display,
            HighPrecisionTimer::new(),
            markers,
        )
        .with_seed(config.seed);
        flow.set_flow();

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            flow,
            stimuli,
            background: config.design.background,
            refresh_rate: None,
            started: false,
            saved: false,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            program = ?self.flow.program.experiment_type(),
            "press SPACE to start or ESC to exit"
        );

        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title("vistim")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor.clone()))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();

        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = ?self.refresh_rate,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SkiaRenderer::new(
            physical_size.width,
            physical_size.height,
            &self.flow.display,
            self.background,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    /// One flow update, then one draw.
    fn frame(&mut self) -> Result<()> {
        if self.started && self.flow.is_active() {
            let running = self.flow.update(&mut self.stimuli);
            self.show_progress();
            if !running {
                info!(presented = self.flow.log.completed(), "run complete, press ESC to exit");
                self.finish();
            }
        }

        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut())
        else {
            return Ok(());
        };
        let stats: FrameStats =
            renderer.render_frame(&self.stimuli, pixels.frame_mut(), self.flow.timer_mut())?;
        let now = self.flow.timer().now();
        pixels.render()?;
        let present = self.flow.timer().elapsed(now);

        trace!(
            present_ms = present.as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            drawn = stats.drawn,
            "frame"
        );

        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn show_progress(&self) {
        if let Some(window) = &self.window {
            let label = self.flow.progress().to_string().replace('\n', ", ");
            window.set_title(&format!("vistim | {label}"));
        }
    }

    fn handle_input(&mut self, key: winit::keyboard::PhysicalKey, event_loop: &ActiveEventLoop) {
        use winit::keyboard::{KeyCode, PhysicalKey};
        if let PhysicalKey::Code(k) = key {
            match k {
                KeyCode::Space if !self.started => {
                    self.flow.mark_head();
                    self.started = true;
                    self.show_progress();
                }
                KeyCode::Escape => self.cleanup_and_exit(event_loop),
                _ => {}
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!(error = %e, "failed to resize canvas");
            }
        }
    }

    /// Writes the log and timing summary once per run.
    fn finish(&mut self) {
        if self.saved || !self.started {
            return;
        }
        self.saved = true;
        save_log(&self.flow, Path::new(LOG_PATH));

        let stats = self.flow.timer().calibration_stats();
        info!(
            avg_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            min_ms = stats.min_frame_time_ns / 1e6,
            max_ms = stats.max_frame_time_ns / 1e6,
            fps = stats.effective_fps,
            "frame timing"
        );
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.flow.is_active() {
            self.flow.abort(&mut self.stimuli);
        }
        self.finish();
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

fn save_log(flow: &Flow, path: &Path) {
    match flow.log.save_json(path) {
        Ok(()) => info!(
            path = %path.display(),
            records = flow.log.len(),
            seed = flow.log.seed,
            "presentation log saved"
        ),
        Err(e) => error!(path = %path.display(), error = %e, "failed to save presentation log"),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    error!(error = %e, "frame failed");
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
