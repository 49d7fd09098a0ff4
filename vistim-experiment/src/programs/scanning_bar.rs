use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    BarParams, Condition, Display, ExperimentDesign, ExperimentType, PhaseTimes, Stimulus,
    StimulusSpec, Transform,
};
use vistim_marker::MarkerHeader;

/// Smallest odd count of `extent`-sized cells that fits in `area`, at least 1.
pub(crate) fn odd_cells(area: f32, extent: f32) -> usize {
    let n = if extent > 0.0 {
        (area / extent).floor().max(0.0) as usize
    } else {
        0
    };
    if n % 2 == 0 { n + 1 } else { n }
}

/// Receptive-field scan: the bar sweeps one row at a time, rows stacked by bar
/// height and visited in random order. Multi-condition runs repeat the rows
/// for each heading; there is no blank slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningBar {
    pub bar: BarParams,
}

impl ScanningBar {
    pub fn rows(&self) -> usize {
        odd_cells(self.bar.move_area, self.bar.height)
    }

    /// Sweep length; rows times bar height.
    pub fn scan_area(&self) -> f64 {
        self.rows() as f64 * self.bar.height as f64
    }

    fn top_row(&self) -> f64 {
        (self.rows() as f64 - 1.0) * self.bar.height as f64 / 2.0
    }

    /// `(row, heading)` for a permutation value.
    fn slot(&self, cue: &Cue<'_>) -> (usize, f64) {
        let rows = self.rows();
        if cue.condition.is_single() {
            (cue.value, (self.bar.direction as f64).to_radians())
        } else {
            let level = cue.value / rows;
            (cue.value % rows, level as f64 * cue.condition.step_radians())
        }
    }

    fn transform(&self, cue: &Cue<'_>, moved: f64) -> Transform {
        let (row, heading) = self.slot(cue);
        let y = self.top_row() - self.bar.height as f64 * row as f64;
        Transform::translation(-self.scan_area() / 2.0 + moved, y)
            .then(Transform::rotation(heading))
            .then(Transform::translation(
                self.bar.center.0 as f64,
                self.bar.center.1 as f64,
            ))
    }
}

impl Kinematics for ScanningBar {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::RfDBar
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        vec![StimulusSpec::Bar(self.bar)]
    }

    fn stimuli_per_trial(&self, condition: &Condition) -> usize {
        if condition.is_single() {
            self.rows()
        } else {
            condition.levels * self.rows()
        }
    }

    fn has_blank(&self, _condition: &Condition) -> bool {
        false
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        let motion = if self.bar.speed > 0.0 {
            self.scan_area() / self.bar.speed as f64
        } else {
            0.0
        };
        PhaseTimes::new(design.pre_duration, motion, design.post_duration)
    }

    fn encode_params(&self, _condition: &Condition, display: &Display, header: &mut MarkerHeader) {
        let b = &self.bar;
        header
            .push_raw(self.rows() as i32)
            .push(b.height, 100.0)
            .push(b.direction, 100.0)
            .push(b.speed, 100.0)
            .push(b.center.0 + 60.0, 100.0)
            .push(b.center.1 + 60.0, 100.0)
            .push(display.height_deg() as f32, 100.0)
            .push(display.width_deg() as f32, 100.0);
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        if let Some(s) = stimuli.first_mut() {
            s.set_world_transform(self.transform(&cue, 0.0));
            s.set_visible(true);
        }
    }

    fn advance<S: Stimulus>(&self, cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        let moved = motion_s * self.bar.speed as f64;
        if let Some(s) = stimuli.first_mut() {
            s.set_world_transform(self.transform(&cue, moved));
        }
    }
}
