use super::drifting_grating::center_of;
use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    Condition, Display, ExperimentDesign, ExperimentType, GratingParams, PhaseTimes, Stimulus,
    StimulusSpec, Transform,
};
use vistim_marker::MarkerHeader;

/// Two gratings drifting side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoDriftingGratings {
    pub gratings: [GratingParams; 2],
    /// Degrees between the two drift directions in multi-condition runs
    pub grating_angle: f32,
}

impl Default for TwoDriftingGratings {
    fn default() -> Self {
        let left = GratingParams {
            tf: 3.0,
            sf: 0.5,
            center: (-5.0, 0.0),
            ..GratingParams::default()
        };
        Self {
            gratings: [
                left,
                GratingParams {
                    tf: 2.0,
                    sf: 1.0,
                    direction: 90.0,
                    diameter: 4.0,
                    center: (5.0, 0.0),
                    ..left
                },
            ],
            grating_angle: 90.0,
        }
    }
}

impl Kinematics for TwoDriftingGratings {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::TwoDGrating
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        self.gratings.iter().copied().map(StimulusSpec::Grating).collect()
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

    fn encode_params(&self, condition: &Condition, _display: &Display, header: &mut MarkerHeader) {
        for g in &self.gratings {
            header.push(g.tf, 10.0).push(g.sf, 100.0);
            if condition.is_single() {
                header.push(g.direction, 1.0);
            }
            header
                .push(g.luminance, 10.0)
                .push(g.contrast, 10.0)
                .push(g.center.0 + 60.0, 10.0)
                .push(g.center.1 + 60.0, 10.0)
                .push(g.diameter, 1.0);
        }
        if !condition.is_single() {
            header.push(self.grating_angle, 1.0);
        }
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        for (i, (g, s)) in self.gratings.iter().zip(stimuli.iter_mut()).enumerate() {
            let heading = if cue.condition.is_single() {
                (g.direction as f64).to_radians()
            } else {
                (self.grating_angle as f64 * i as f64).to_radians() + cue.level_radians()
            };
            s.set_world_transform(Transform::rotation(heading).then(center_of(g)));
            s.set_visible(true);
        }
    }

    fn advance<S: Stimulus>(&self, _cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        stimuli
            .iter_mut()
            .take(self.gratings.len())
            .for_each(|s| s.set_temporal_phase(motion_s));
    }

    fn rewind<S: Stimulus>(&self, stimuli: &mut [S]) {
        stimuli.iter_mut().for_each(|s| s.set_temporal_phase(0.0));
    }
}
