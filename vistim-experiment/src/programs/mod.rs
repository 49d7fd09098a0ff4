//! The stimulus programs. Each is a [`Kinematics`] strategy; the
//! [`StimulusProgram`] enum picks one from configuration.

mod drifting_bar;
mod drifting_grating;
mod flashing_grid;
mod scanning_bar;
mod two_bars;
mod two_gratings;

pub use drifting_bar::{DriftingBar, sweep_transform};
pub use drifting_grating::DriftingGrating;
pub use flashing_grid::{FlashingGrid, GridCell};
pub use scanning_bar::ScanningBar;
pub use two_bars::TwoDriftingBars;
pub use two_gratings::TwoDriftingGratings;

use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    Condition, ConditionParameter, Display, ExperimentDesign, ExperimentType, PhaseTimes,
    Stimulus, StimulusSpec,
};
use vistim_marker::MarkerHeader;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StimulusProgram {
    DriftingBar(DriftingBar),
    DriftingGrating(DriftingGrating),
    ScanningBar(ScanningBar),
    FlashingGrid(FlashingGrid),
    TwoDriftingBars(TwoDriftingBars),
    TwoDriftingGratings(TwoDriftingGratings),
}

impl Default for StimulusProgram {
    fn default() -> Self {
        StimulusProgram::DriftingBar(DriftingBar::default())
    }
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $body:expr) => {
        match $self {
            StimulusProgram::DriftingBar($p) => $body,
            StimulusProgram::DriftingGrating($p) => $body,
            StimulusProgram::ScanningBar($p) => $body,
            StimulusProgram::FlashingGrid($p) => $body,
            StimulusProgram::TwoDriftingBars($p) => $body,
            StimulusProgram::TwoDriftingGratings($p) => $body,
        }
    };
}

impl Kinematics for StimulusProgram {
    fn experiment_type(&self) -> ExperimentType {
        dispatch!(self, p => p.experiment_type())
    }

    fn condition_parameter(&self) -> ConditionParameter {
        dispatch!(self, p => p.condition_parameter())
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        dispatch!(self, p => p.stimulus_specs())
    }

    fn stimuli_per_trial(&self, condition: &Condition) -> usize {
        dispatch!(self, p => p.stimuli_per_trial(condition))
    }

    fn has_blank(&self, condition: &Condition) -> bool {
        dispatch!(self, p => p.has_blank(condition))
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        dispatch!(self, p => p.phase_times(design))
    }

    fn zero_gap(&self) -> bool {
        dispatch!(self, p => p.zero_gap())
    }

    fn encode_params(&self, condition: &Condition, display: &Display, header: &mut MarkerHeader) {
        dispatch!(self, p => p.encode_params(condition, display, header))
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        dispatch!(self, p => p.arrange(cue, stimuli))
    }

    fn advance<S: Stimulus>(&self, cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        dispatch!(self, p => p.advance(cue, motion_s, stimuli))
    }

    fn rewind<S: Stimulus>(&self, stimuli: &mut [S]) {
        dispatch!(self, p => p.rewind(stimuli))
    }
}
