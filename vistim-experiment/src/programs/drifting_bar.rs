use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    BarParams, Condition, Display, ExperimentDesign, ExperimentType, PhaseTimes, Stimulus,
    StimulusSpec, Transform,
};
use vistim_marker::MarkerHeader;

/// Bar sweeping across `move_area` along its heading, centred on `center`.
///
/// Local frame: orient the bar, slide it along x by `moved`, turn x onto the
/// heading, then move to the centre.
pub fn sweep_transform(bar: &BarParams, moved: f64, heading_rad: f64) -> Transform {
    Transform::rotation_degrees(bar.orientation as f64)
        .then(Transform::translation(-bar.move_area as f64 / 2.0 + moved, 0.0))
        .then(Transform::rotation(heading_rad))
        .then(Transform::translation(bar.center.0 as f64, bar.center.1 as f64))
}

/// Single drifting bar. Multi-condition runs turn the heading in `N` even steps
/// and add one blank slot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftingBar {
    pub bar: BarParams,
}

impl DriftingBar {
    fn heading(&self, cue: &Cue<'_>) -> f64 {
        if cue.condition.is_single() {
            (self.bar.direction as f64).to_radians()
        } else {
            cue.level_radians()
        }
    }
}

impl Kinematics for DriftingBar {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::DBar
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        vec![StimulusSpec::Bar(self.bar)]
    }

    fn stimuli_per_trial(&self, condition: &Condition) -> usize {
        condition.levels + 1
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        PhaseTimes::new(
            design.pre_duration,
            self.bar.sweep_seconds(),
            design.post_duration,
        )
    }

    fn encode_params(&self, condition: &Condition, _display: &Display, header: &mut MarkerHeader) {
        let b = &self.bar;
        header.push(b.height, 10.0).push(b.width, 10.0).push(b.orientation, 1.0);
        if condition.is_single() {
            header.push(b.direction, 1.0);
        }
        header
            .push(b.speed, 1.0)
            .push(b.center.0 + 60.0, 10.0)
            .push(b.center.1 + 60.0, 10.0);
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        if let Some(s) = stimuli.first_mut() {
            s.set_world_transform(sweep_transform(&self.bar, 0.0, self.heading(&cue)));
            s.set_visible(true);
        }
    }

    fn advance<S: Stimulus>(&self, cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        let moved = motion_s * self.bar.speed as f64;
        if let Some(s) = stimuli.first_mut() {
            s.set_world_transform(sweep_transform(&self.bar, moved, self.heading(&cue)));
        }
    }
}
