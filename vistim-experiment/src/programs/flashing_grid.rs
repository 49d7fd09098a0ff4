use super::scanning_bar::odd_cells;
use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    BarParams, Condition, ConditionParameter, Display, ExperimentDesign, ExperimentType,
    PhaseTimes, Stimulus, StimulusSpec, Transform,
};
use vistim_marker::MarkerHeader;

/// Reverse-correlation grid: every cell flashes once per trial in a dark and
/// a light version, back to back with no rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashingGrid {
    pub bar: BarParams,
    pub dark: [u8; 4],
    pub light: [u8; 4],
}

impl Default for FlashingGrid {
    fn default() -> Self {
        Self {
            bar: BarParams {
                width: 1.5,
                height: 0.5,
                ..BarParams::default()
            },
            dark: [0, 0, 0, 255],
            light: [255, 255, 255, 255],
        }
    }
}

/// Grid cell addressed by one permutation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    /// 0 dark, 1 light
    pub which: usize,
}

impl FlashingGrid {
    pub fn rows(&self) -> usize {
        odd_cells(self.bar.move_area, self.bar.height)
    }

    pub fn columns(&self) -> usize {
        odd_cells(self.bar.move_area, self.bar.width)
    }

    pub fn cell(&self, value: usize) -> GridCell {
        let per_row = self.columns() * 2;
        let rest = value % per_row;
        GridCell {
            row: value / per_row,
            column: rest / 2,
            which: rest % 2,
        }
    }

    fn transform(&self, cell: GridCell) -> Transform {
        let (w, h) = (self.bar.width as f64, self.bar.height as f64);
        let x = -(self.columns() as f64 - 1.0) * w / 2.0 + w * cell.column as f64;
        let y = (self.rows() as f64 - 1.0) * h / 2.0 - h * cell.row as f64;
        Transform::translation(x, y)
            .then(Transform::rotation_degrees(self.bar.orientation as f64))
            .then(Transform::translation(
                self.bar.center.0 as f64,
                self.bar.center.1 as f64,
            ))
    }
}

impl Kinematics for FlashingGrid {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::RfFBar
    }

    fn condition_parameter(&self) -> ConditionParameter {
        ConditionParameter::Orientation
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        [self.dark, self.light]
            .into_iter()
            .map(|color| StimulusSpec::Bar(BarParams { color, ..self.bar }))
            .collect()
    }

    fn stimuli_per_trial(&self, _condition: &Condition) -> usize {
        self.rows() * self.columns() * 2
    }

    fn has_blank(&self, _condition: &Condition) -> bool {
        false
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        PhaseTimes::fixed(design.stimulus_duration)
    }

    fn zero_gap(&self) -> bool {
        true
    }

    fn encode_params(&self, _condition: &Condition, display: &Display, header: &mut MarkerHeader) {
        let b = &self.bar;
        header
            .push(b.height, 10.0)
            .push(b.width, 10.0)
            .push(b.orientation, 1.0)
            .push_raw(self.rows() as i32)
            .push_raw(self.columns() as i32)
            .push(b.center.0 + 60.0, 10.0)
            .push(b.center.1 + 60.0, 10.0)
            .push(display.height_deg() as f32, 1.0)
            .push(display.width_deg() as f32, 1.0);
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        let cell = self.cell(cue.value);
        let world = self.transform(cell);
        for (i, s) in stimuli.iter_mut().enumerate() {
            if i == cell.which {
                s.set_world_transform(world);
                s.set_visible(true);
            } else {
                s.set_visible(false);
            }
        }
    }

    fn advance<S: Stimulus>(&self, _cue: Cue<'_>, _motion_s: f64, _stimuli: &mut [S]) {}
}
