use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    Condition, Display, ExperimentDesign, ExperimentType, GratingParams, PhaseTimes, Stimulus,
    StimulusSpec, Transform,
};
use vistim_marker::MarkerHeader;

pub(crate) fn encode_grating(g: &GratingParams, header: &mut MarkerHeader) {
    header
        .push(g.tf, 100.0)
        .push(g.sf, 100.0)
        .push(g.spatial_phase, 100.0)
        .push(g.orientation, 100.0)
        .push(g.direction, 100.0)
        .push(g.luminance, 100.0)
        .push(g.contrast, 100.0)
        .push(g.center.0 + 60.0, 100.0)
        .push(g.center.1 + 60.0, 100.0)
        .push(g.diameter, 100.0);
}

pub(crate) fn center_of(g: &GratingParams) -> Transform {
    Transform::translation(g.center.0 as f64, g.center.1 as f64)
}

/// Single drifting grating in a fixed aperture. The condition turns the drift
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftingGrating {
    pub grating: GratingParams,
}

impl Kinematics for DriftingGrating {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::DGrating
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        vec![StimulusSpec::Grating(self.grating)]
    }

    fn stimuli_per_trial(&self, condition: &Condition) -> usize {
        condition.levels + 1
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        PhaseTimes::new(
            design.pre_duration,
            design.stimulus_duration,
            design.post_duration,
        )
    }

    fn encode_params(&self, _condition: &Condition, _display: &Display, header: &mut MarkerHeader) {
        encode_grating(&self.grating, header);
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        let heading = if cue.condition.is_single() {
            (self.grating.direction as f64).to_radians()
        } else {
            cue.level_radians()
        };
        if let Some(s) = stimuli.first_mut() {
            s.set_orientation_transform(Transform::rotation(heading));
            s.set_world_transform(center_of(&self.grating));
            s.set_visible(true);
        }
    }

    fn advance<S: Stimulus>(&self, _cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        if let Some(s) = stimuli.first_mut() {
            s.set_temporal_phase(motion_s);
        }
    }

    fn rewind<S: Stimulus>(&self, stimuli: &mut [S]) {
        stimuli.iter_mut().for_each(|s| s.set_temporal_phase(0.0));
    }
}
