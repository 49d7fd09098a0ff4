use super::drifting_bar::sweep_transform;
use crate::kinematics::{Cue, Kinematics};
use serde::{Deserialize, Serialize};
use vistim_core::{
    BarParams, Condition, Display, ExperimentDesign, ExperimentType, PhaseTimes, Stimulus,
    StimulusSpec,
};
use vistim_marker::MarkerHeader;

/// Two bars drifting together. The sweep time is set by the first bar. In
/// multi-condition runs both headings turn with the level, the second offset
/// by `bar_angle` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoDriftingBars {
    pub bars: [BarParams; 2],
    pub bar_angle: f32,
}

impl Default for TwoDriftingBars {
    fn default() -> Self {
        let first = BarParams {
            width: 4.0,
            height: 1.0,
            orientation: 90.0,
            move_area: 8.0,
            center: (-2.0, -2.0),
            ..BarParams::default()
        };
        Self {
            bars: [
                first,
                BarParams {
                    center: (2.0, 2.0),
                    color: [255, 0, 0, 128],
                    ..first
                },
            ],
            bar_angle: 90.0,
        }
    }
}

impl TwoDriftingBars {
    fn heading(&self, i: usize, cue: &Cue<'_>) -> f64 {
        if cue.condition.is_single() {
            (self.bars[i].direction as f64).to_radians()
        } else {
            (self.bar_angle as f64 * i as f64).to_radians() + cue.level_radians()
        }
    }

    fn place<S: Stimulus>(&self, cue: &Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        for (i, (bar, s)) in self.bars.iter().zip(stimuli.iter_mut()).enumerate() {
            let moved = motion_s * bar.speed as f64;
            s.set_world_transform(sweep_transform(bar, moved, self.heading(i, cue)));
        }
    }
}

impl Kinematics for TwoDriftingBars {
    fn experiment_type(&self) -> ExperimentType {
        ExperimentType::TwoDBar
    }

    fn stimulus_specs(&self) -> Vec<StimulusSpec> {
        self.bars.iter().copied().map(StimulusSpec::Bar).collect()
    }

    fn stimuli_per_trial(&self, condition: &Condition) -> usize {
        condition.levels + 1
    }

    fn phase_times(&self, design: &ExperimentDesign) -> PhaseTimes {
        PhaseTimes::new(
            design.pre_duration,
            self.bars[0].sweep_seconds(),
            design.post_duration,
        )
    }

    fn encode_params(&self, condition: &Condition, _display: &Display, header: &mut MarkerHeader) {
        for b in &self.bars {
            header
                .push(b.height, 100.0)
                .push(b.width, 100.0)
                .push(b.orientation, 100.0)
                .push(b.direction, 100.0)
                .push(b.speed, 100.0)
                .push(b.center.0 + 60.0, 100.0)
                .push(b.center.1 + 60.0, 100.0);
        }
        if !condition.is_single() {
            header.push(self.bar_angle, 1.0);
        }
    }

    fn arrange<S: Stimulus>(&self, cue: Cue<'_>, stimuli: &mut [S]) {
        self.place(&cue, 0.0, stimuli);
        stimuli
            .iter_mut()
            .take(self.bars.len())
            .for_each(|s| s.set_visible(true));
    }

    fn advance<S: Stimulus>(&self, cue: Cue<'_>, motion_s: f64, stimuli: &mut [S]) {
        self.place(&cue, motion_s, stimuli);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistim_core::{ConditionParameter, StimulusState, Transform};

    #[test]
    fn header_encodes_both_bars_then_the_angle() {
        let p = TwoDriftingBars::default();
        let mut h = MarkerHeader {
            experiment_type: 10,
            condition_key: 2,
            levels: 4,
            seed: 0,
            trials: 1,
            params: Vec::new(),
        };
        p.encode_params(
            &Condition::new(ConditionParameter::Direction, 4),
            &Display::default(),
            &mut h,
        );
        assert_eq!(
            h.params,
            vec![
                100, 400, 9000, 0, 1000, 5800, 5800, //
                100, 400, 9000, 0, 1000, 6200, 6200, //
                90,
            ]
        );

        let mut single = MarkerHeader { params: Vec::new(), ..h };
        p.encode_params(
            &Condition::single(ConditionParameter::Direction),
            &Display::default(),
            &mut single,
        );
        assert_eq!(single.params.len(), 14);
    }

    #[test]
    fn second_bar_heading_is_offset_by_the_bar_angle() {
        let p = TwoDriftingBars {
            bars: [BarParams::default(), BarParams::default()],
            bar_angle: 90.0,
        };
        let c = Condition::new(ConditionParameter::Direction, 4);
        let mut s = [StimulusState::default(), StimulusState::default()];
        p.arrange(Cue { condition: &c, value: 1 }, &mut s);
        assert!(s.iter().all(|b| b.visible));
        let expected = sweep_transform(&p.bars[1], 0.0, std::f64::consts::FRAC_PI_2);
        assert!(s[1].world.approx_eq(&expected, 1e-12));
        assert!(s[0].world.approx_eq(&sweep_transform(&p.bars[0], 0.0, 0.0), 1e-12));
        assert!(!s[0].world.approx_eq(&Transform::IDENTITY, 1e-12));
    }
}
