use crate::error::ConfigError;
use crate::kinematics::{Kinematics, align_condition};
use crate::programs::StimulusProgram;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use vistim_core::{Condition, ConditionParameter, Display, ExperimentDesign};
use vistim_marker::PortConfig;

/// Condition as written in a config file. `levels` is signed so that bad
/// values can be caught and repaired instead of failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    pub parameter: ConditionParameter,
    pub levels: i64,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            parameter: ConditionParameter::Direction,
            levels: 4,
        }
    }
}

impl ConditionConfig {
    pub fn to_condition(&self) -> Condition {
        Condition::new(self.parameter, self.levels.max(0) as usize)
    }
}

/// Everything a run needs, loaded from JSON before the flow is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExperimentConfig {
    pub design: ExperimentDesign,
    pub condition: ConditionConfig,
    pub program: StimulusProgram,
    pub display: Display,
    pub marker: PortConfig,
    /// Fixed seed for replaying a run
    pub seed: Option<u64>,
}

fn non_negative(name: &str, value: &mut f64, warnings: &mut Vec<String>) {
    if !(*value >= 0.0) {
        warnings.push(format!("{name} was {value}, using 0"));
        *value = 0.0;
    }
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Repairs degenerate values to the smallest valid run. Returns what was
    /// changed; each change is also logged.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.condition.levels < 0 {
            warnings.push(format!(
                "condition levels was {}, running single condition",
                self.condition.levels
            ));
            self.condition.levels = 0;
        }
        let mut condition = self.condition.to_condition();
        if let Some(replaced) = align_condition(&self.program, &mut condition) {
            warnings.push(format!(
                "{:?} does not vary {replaced:?}, using {:?}",
                self.program.experiment_type(),
                condition.parameter
            ));
            self.condition.parameter = condition.parameter;
        }
        if self.design.trials == 0 {
            warnings.push("trial count was 0, using 1".to_string());
            self.design.trials = 1;
        }

        let d = &mut self.design;
        non_negative("inter_trial_rest", &mut d.inter_trial_rest, &mut warnings);
        non_negative("inter_stimulus_rest", &mut d.inter_stimulus_rest, &mut warnings);
        non_negative("pre_duration", &mut d.pre_duration, &mut warnings);
        non_negative("stimulus_duration", &mut d.stimulus_duration, &mut warnings);
        non_negative("post_duration", &mut d.post_duration, &mut warnings);

        let speeds: Vec<f32> = match &self.program {
            StimulusProgram::DriftingBar(p) => vec![p.bar.speed],
            StimulusProgram::ScanningBar(p) => vec![p.bar.speed],
            StimulusProgram::TwoDriftingBars(p) => p.bars.iter().map(|b| b.speed).collect(),
            _ => Vec::new(),
        };
        if speeds.iter().any(|s| !(*s > 0.0)) {
            warnings.push("bar speed is not positive, bars will not move".to_string());
        }

        for w in &warnings {
            warn!("config: {w}");
        }
        warnings
    }

    pub fn condition(&self) -> Condition {
        self.condition.to_condition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_the_drifting_bar_demo() {
        let cfg = ExperimentConfig::default();
        assert!(matches!(cfg.program, StimulusProgram::DriftingBar(_)));
        assert_eq!(cfg.condition().levels, 4);
        assert_eq!(cfg.design.trials, 3);
        assert_eq!(cfg.marker, PortConfig::Null);
    }

    #[test]
    fn negative_levels_fall_back_to_single_condition() {
        let mut cfg =
            ExperimentConfig::from_json(r#"{"condition": {"parameter": "Direction", "levels": -3}}"#)
                .unwrap();
        let warnings = cfg.sanitize();
        assert_eq!(warnings.len(), 1);
        assert!(cfg.condition().is_single());
        assert_eq!(cfg.program.stimuli_per_trial(&cfg.condition()), 1);
    }

    #[test]
    fn zero_trials_and_negative_rests_are_repaired() {
        let mut cfg = ExperimentConfig::from_json(
            r#"{"design": {"trials": 0, "inter_trial_rest": -1.0}, "seed": 42}"#,
        )
        .unwrap();
        let warnings = cfg.sanitize();
        assert_eq!(warnings.len(), 2);
        assert_eq!(cfg.design.trials, 1);
        assert_eq!(cfg.design.inter_trial_rest, 0.0);
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let mut cfg = ExperimentConfig::default();
        assert!(cfg.sanitize().is_empty());
    }

    #[test]
    fn condition_key_follows_the_program_axis() {
        let mut cfg = ExperimentConfig::from_json(
            r#"{"program": {"type": "drifting_grating"},
                "condition": {"parameter": "SpatialFreq", "levels": 4}}"#,
        )
        .unwrap();
        let warnings = cfg.sanitize();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert_eq!(cfg.condition().parameter, ConditionParameter::Direction);
        assert_eq!(cfg.condition().levels, 4, "level count is kept");

        let mut grid = ExperimentConfig::from_json(
            r#"{"program": {"type": "flashing_grid"}, "condition": {"levels": 0}}"#,
        )
        .unwrap();
        grid.sanitize();
        assert_eq!(grid.condition().parameter, ConditionParameter::Orientation);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ExperimentConfig::load("/nonexistent/vistim.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ExperimentConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
