use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Parameter axis varied across stimuli. The code is the second marker header
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionParameter {
    None,
    Orientation,
    Direction,
    Speed,
    Luminance,
    Contrast,
    SpatialFreq,
    SpatialPhase,
    TemporalFreq,
    TemporalPhase,
    Color,
    Disparity,
    Size,
    Location,
}

impl ConditionParameter {
    pub fn code(self) -> i32 {
        match self {
            ConditionParameter::None => 0,
            ConditionParameter::Orientation => 1,
            ConditionParameter::Direction => 2,
            ConditionParameter::Speed => 3,
            ConditionParameter::Luminance => 4,
            ConditionParameter::Contrast => 5,
            ConditionParameter::SpatialFreq => 6,
            ConditionParameter::SpatialPhase => 7,
            ConditionParameter::TemporalFreq => 8,
            ConditionParameter::TemporalPhase => 9,
            ConditionParameter::Color => 10,
            ConditionParameter::Disparity => 11,
            ConditionParameter::Size => 12,
            ConditionParameter::Location => 13,
        }
    }
}

/// One condition axis with `levels` discrete values spread over a full turn.
///
/// `levels == 0` is single-condition mode: one fixed stimulus, no blank slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: ConditionParameter,
    pub levels: usize,
}

impl Condition {
    pub fn new(parameter: ConditionParameter, levels: usize) -> Self {
        Self { parameter, levels }
    }

    pub fn single(parameter: ConditionParameter) -> Self {
        Self::new(parameter, 0)
    }

    pub fn is_single(&self) -> bool {
        self.levels == 0
    }

    /// Angular distance between neighbouring levels.
    pub fn step_radians(&self) -> f64 {
        if self.levels == 0 {
            0.0
        } else {
            TAU / self.levels as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_levels_span_a_full_turn() {
        let c = Condition::new(ConditionParameter::Direction, 4);
        assert!(!c.is_single());
        assert!((c.step_radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn single_condition_has_no_step() {
        let c = Condition::single(ConditionParameter::Direction);
        assert!(c.is_single());
        assert_eq!(c.step_radians(), 0.0);
    }

    #[test]
    fn parameter_codes_are_stable() {
        assert_eq!(ConditionParameter::Orientation.code(), 1);
        assert_eq!(ConditionParameter::Direction.code(), 2);
        assert_eq!(ConditionParameter::SpatialFreq.code(), 6);
        assert_eq!(ConditionParameter::Location.code(), 13);
    }
}
