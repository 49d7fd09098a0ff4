use crate::transform::Transform;
use serde::{Deserialize, Serialize};

/// Capability the experiment flow drives. Rendering backends implement it and
/// keep their own resources; the flow only ever touches this state.
pub trait Stimulus: std::fmt::Debug {
    fn set_world_transform(&mut self, world: Transform);
    fn set_orientation_transform(&mut self, orientation: Transform);
    fn set_visible(&mut self, visible: bool);

    /// Seconds into the drift. Only gratings care.
    fn set_temporal_phase(&mut self, _seconds: f64) {}

    fn state(&self) -> &StimulusState;
}

/// Plain presenter state. Also serves as a headless stimulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusState {
    pub world: Transform,
    pub orientation: Transform,
    pub visible: bool,
    pub temporal_phase: f64,
}

impl Default for StimulusState {
    fn default() -> Self {
        Self {
            world: Transform::IDENTITY,
            orientation: Transform::IDENTITY,
            visible: false,
            temporal_phase: 0.0,
        }
    }
}

impl Stimulus for StimulusState {
    fn set_world_transform(&mut self, world: Transform) {
        self.world = world;
    }

    fn set_orientation_transform(&mut self, orientation: Transform) {
        self.orientation = orientation;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_temporal_phase(&mut self, seconds: f64) {
        self.temporal_phase = seconds;
    }

    fn state(&self) -> &StimulusState {
        self
    }
}

/// Bar geometry and kinematics. Lengths in degrees, angles in degrees,
/// speed in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarParams {
    pub width: f32,
    pub height: f32,
    pub orientation: f32,
    pub direction: f32,
    pub speed: f32,
    /// Distance travelled during one sweep
    pub move_area: f32,
    pub center: (f32, f32),
    pub color: [u8; 4],
}

impl Default for BarParams {
    fn default() -> Self {
        Self {
            width: 3.0,
            height: 1.0,
            orientation: 0.0,
            direction: 0.0,
            speed: 10.0,
            move_area: 10.0,
            center: (0.0, 0.0),
            color: [255, 255, 255, 255],
        }
    }
}

impl BarParams {
    /// Seconds one sweep across `move_area` takes. Zero speed never moves.
    pub fn sweep_seconds(&self) -> f64 {
        if self.speed > 0.0 {
            self.move_area as f64 / self.speed as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GratingType {
    #[default]
    Sinusoidal,
    /// Sawtooth luminance ramp
    Linear,
    Square,
}

/// Grating appearance. `tf` in Hz, `sf` in cycles per degree, phases in
/// cycles, luminance and contrast in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GratingParams {
    pub grating_type: GratingType,
    pub tf: f32,
    pub sf: f32,
    pub spatial_phase: f32,
    pub orientation: f32,
    pub direction: f32,
    pub luminance: f32,
    pub contrast: f32,
    pub diameter: f32,
    pub center: (f32, f32),
    pub high_color: [u8; 4],
    pub low_color: [u8; 4],
}

impl Default for GratingParams {
    fn default() -> Self {
        Self {
            grating_type: GratingType::Sinusoidal,
            tf: 2.0,
            sf: 0.5,
            spatial_phase: 0.0,
            orientation: 0.0,
            direction: 0.0,
            luminance: 0.5,
            contrast: 1.0,
            diameter: 5.0,
            center: (0.0, 0.0),
            high_color: [255, 255, 255, 255],
            low_color: [0, 0, 0, 255],
        }
    }
}

/// What a program asks the backend to construct, one per driven slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StimulusSpec {
    Bar(BarParams),
    Grating(GratingParams),
}
