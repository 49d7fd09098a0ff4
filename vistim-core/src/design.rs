use serde::{Deserialize, Serialize};

/// Experiment type. The numeric code is the first field of every marker
/// header, so codes must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentType {
    None,
    /// Drifting bar
    DBar,
    /// Drifting bar receptive-field mapping
    RfDBar,
    /// Flashing bar
    FBar,
    /// Flashing bar receptive-field mapping
    RfFBar,
    /// Drifting grating
    DGrating,
    /// Standing grating
    FGrating,
    Plaid,
    RandomLine,
    OpticFlow,
    TwoDBar,
    TwoDGrating,
    TwoFBar,
    TwoFGrating,
    Context,
    Rf,
}

impl ExperimentType {
    pub fn code(self) -> i32 {
        match self {
            ExperimentType::None => 0,
            ExperimentType::DBar => 1,
            ExperimentType::RfDBar => 2,
            ExperimentType::FBar => 3,
            ExperimentType::RfFBar => 4,
            ExperimentType::DGrating => 5,
            ExperimentType::FGrating => 6,
            ExperimentType::Plaid => 7,
            ExperimentType::RandomLine => 8,
            ExperimentType::OpticFlow => 9,
            ExperimentType::TwoDBar => 10,
            ExperimentType::TwoDGrating => 11,
            ExperimentType::TwoFBar => 12,
            ExperimentType::TwoFGrating => 13,
            ExperimentType::Context => 14,
            ExperimentType::Rf => 15,
        }
    }
}

/// Per-run experiment design. Durations are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentDesign {
    pub trials: usize,
    /// Rest between trials (`trestT`)
    pub inter_trial_rest: f64,
    /// Rest between stimuli of one trial (`srestT`)
    pub inter_stimulus_rest: f64,
    /// Stimulus visible but static before motion (`preT`)
    pub pre_duration: f64,
    /// Stimulus on (`durT`)
    pub stimulus_duration: f64,
    /// Frozen hold after motion (`posT`)
    pub post_duration: f64,
    pub background: [u8; 4],
}

impl Default for ExperimentDesign {
    fn default() -> Self {
        Self {
            trials: 3,
            inter_trial_rest: 1.0,
            inter_stimulus_rest: 0.5,
            pre_duration: 0.25,
            stimulus_duration: 1.0,
            post_duration: 0.25,
            background: [0, 0, 0, 255],
        }
    }
}
