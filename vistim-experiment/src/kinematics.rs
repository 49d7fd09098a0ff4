use vistim_core::{
    Condition, ConditionParameter, Display, ExperimentDesign, ExperimentType, PhaseTimes,
    Stimulus, StimulusSpec,
};
use vistim_marker::MarkerHeader;

/// The slot currently being presented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue<'a> {
    pub condition: &'a Condition,
    /// Permutation value for this slot
    pub value: usize,
}

impl Cue<'_> {
    /// Rotation for condition level `value - 1`; slot 0 is the blank.
    pub fn level_radians(&self) -> f64 {
        self.value.saturating_sub(1) as f64 * self.condition.step_radians()
    }
}

/// How one stimulus program moves its stimuli. The experiment flow owns the
/// sequencing and calls into this for geometry.
pub trait Kinematics {
    fn experiment_type(&self) -> ExperimentType;

    /// The one axis this program varies. The header key must match it.
    fn condition_parameter(&self) -> ConditionParameter {
        ConditionParameter::Direction
    }

    /// Stimulus objects the program drives, in slot order.
    fn stimulus_specs(&self) -> Vec<StimulusSpec>;

    /// Presentations per trial.
    fn stimuli_per_trial(&self, condition: &Condition) -> usize;

    /// Whether permutation value 0 is a blank control.
    fn has_blank(&self, condition: &Condition) -> bool {
        !condition.is_single()
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes;

    /// Reverse-correlation programs present back to back.
    fn zero_gap(&self) -> bool {
        false
    }

    /// Appends the program's own header fields.
    fn encode_params(&self, condition: &Condition, display: &Display, header: &mut MarkerHeader);

    /// Initial transform and visibility on the first tick of a slot.
    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]);

    /// Motion update, `motion_s` seconds after the pre window closed.
    fn advance<S: Stimulus>(&self, cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]);

    /// Called when moving to the next slot.
    fn rewind<S: Stimulus>(&self, _stimuli: &mut [S]) {}
}

/// Moves `condition` onto the axis `program` varies, keeping its level count.
/// Returns the key that was replaced, if any.
pub fn align_condition<K: Kinematics>(
    program: &K,
    condition: &mut Condition,
) -> Option<ConditionParameter> {
    let wanted = program.condition_parameter();
    if condition.parameter == wanted {
        return None;
    }
    let replaced = condition.parameter;
    condition.parameter = wanted;
    Some(replaced)
}

pub fn hide_all<S: Stimulus>(stimuli: &mut [S]) {
    stimuli.iter_mut().for_each(|s| s.set_visible(false));
}
