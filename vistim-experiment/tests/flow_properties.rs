use vistim_core::{
    BarParams, Condition, ConditionParameter, Display, ExperimentDesign, GratingParams,
    StimulusState, Transform,
};
use vistim_experiment::programs::{
    DriftingBar, DriftingGrating, FlashingGrid, ScanningBar, TwoDriftingBars, TwoDriftingGratings,
};
use vistim_experiment::{ExperimentFlow, Kinematics, StimulusProgram};
use vistim_marker::{MarkerChannel, MarkerError, MarkerPort, RecordingPort};
use vistim_timing::ManualTimer;

const FRAME: f64 = 1.0 / 120.0;

struct Rig<K: Kinematics, P: MarkerPort> {
    flow: ExperimentFlow<K, ManualTimer, P>,
    clock: ManualTimer,
    stimuli: Vec<StimulusState>,
}

fn quick_design(trials: usize) -> ExperimentDesign {
    ExperimentDesign {
        trials,
        inter_trial_rest: 0.2,
        inter_stimulus_rest: 0.1,
        pre_duration: 0.1,
        stimulus_duration: 0.2,
        post_duration: 0.1,
        ..ExperimentDesign::default()
    }
}

fn rig_with_port<K: Kinematics, P: MarkerPort>(
    program: K,
    design: ExperimentDesign,
    condition: Condition,
    seed: u64,
    port: P,
) -> Rig<K, P> {
    let clock = ManualTimer::new();
    let stimuli = vec![StimulusState::default(); program.stimulus_specs().len()];
    let mut flow = ExperimentFlow::new(
        program,
        design,
        condition,
        Display::default(),
        clock.clone(),
        MarkerChannel::new(port),
    )
    .with_seed(Some(seed));
    flow.set_flow();
    flow.mark_head();
    Rig {
        flow,
        clock,
        stimuli,
    }
}

fn rig<K: Kinematics>(
    program: K,
    design: ExperimentDesign,
    condition: Condition,
    seed: u64,
) -> (Rig<K, RecordingPort>, RecordingPort) {
    let port = RecordingPort::new();
    (rig_with_port(program, design, condition, seed, port.clone()), port)
}

impl<K: Kinematics, P: MarkerPort> Rig<K, P> {
    fn run(&mut self) -> usize {
        let mut frames = 0;
        while self.flow.update(&mut self.stimuli) {
            self.clock.advance_secs(FRAME);
            frames += 1;
            assert!(frames < 2_000_000, "run did not terminate");
        }
        frames
    }
}

fn direction(levels: usize) -> Condition {
    Condition::new(ConditionParameter::Direction, levels)
}

fn small_grid() -> FlashingGrid {
    FlashingGrid {
        bar: BarParams {
            width: 2.0,
            height: 2.0,
            move_area: 6.0,
            ..BarParams::default()
        },
        ..FlashingGrid::default()
    }
}

fn every_program() -> Vec<StimulusProgram> {
    vec![
        StimulusProgram::DriftingBar(DriftingBar::default()),
        StimulusProgram::DriftingGrating(DriftingGrating::default()),
        StimulusProgram::ScanningBar(ScanningBar {
            bar: BarParams {
                height: 4.0,
                ..BarParams::default()
            },
        }),
        StimulusProgram::FlashingGrid(small_grid()),
        StimulusProgram::TwoDriftingBars(TwoDriftingBars::default()),
        StimulusProgram::TwoDriftingGratings(TwoDriftingGratings::default()),
    ]
}

#[test]
fn onsets_and_offsets_match_the_presentation_count() {
    for program in every_program() {
        for levels in [0, 4] {
            let condition = direction(levels);
            let per_trial = program.stimuli_per_trial(&condition);
            let (mut rig, port) = rig(program, quick_design(3), condition, 11);
            rig.run();

            let expected = 3 * per_trial;
            let name = format!("{:?} with {levels} levels", program.experiment_type());
            assert_eq!(rig.flow.state.onsets, expected, "{name}: onsets");
            assert_eq!(rig.flow.state.offsets, expected, "{name}: offsets");
            assert_eq!(port.trigger_count(), 2 * expected, "{name}: trigger pulses");
            assert_eq!(rig.flow.log.completed(), expected, "{name}: closed records");
            assert!(
                rig.stimuli.iter().all(|s| !s.visible),
                "{name}: everything hidden at the end"
            );
        }
    }
}

#[test]
fn every_trial_permutation_is_a_bijection() {
    let (mut rig, _) = rig(DriftingBar::default(), quick_design(6), direction(4), 3);
    rig.run();
    for trial in 0..6 {
        let mut values: Vec<usize> = rig
            .flow
            .log
            .records
            .iter()
            .filter(|r| r.trial == trial)
            .map(|r| r.value)
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2, 3, 4], "trial {trial} covers 0..=N once");
    }
}

#[test]
fn same_seed_replays_the_run() {
    let (mut a, _) = rig(DriftingBar::default(), quick_design(4), direction(8), 150);
    let (mut b, _) = rig(DriftingBar::default(), quick_design(4), direction(8), 150);
    assert_eq!(a.flow.sequencer.sequence(), b.flow.sequencer.sequence());
    a.run();
    b.run();
    let order = |r: &Rig<DriftingBar, RecordingPort>| -> Vec<usize> {
        r.flow.log.records.iter().map(|p| p.value).collect()
    };
    assert_eq!(order(&a), order(&b));

    let trials: Vec<Vec<usize>> = order(&a).chunks(9).map(|c| c.to_vec()).collect();
    assert!(
        trials.windows(2).any(|w| w[0] != w[1]),
        "later trials are reshuffled"
    );
}

#[test]
fn header_is_bit_exact() {
    let program = TwoDriftingGratings {
        gratings: [
            GratingParams {
                tf: 3.0,
                sf: 0.8,
                ..GratingParams::default()
            },
            GratingParams::default(),
        ],
        grating_angle: 45.0,
    };
    let (rig, port) = rig(program, quick_design(2), direction(4), 17);
    let values = port.header_values();
    assert_eq!(&values[..5], &[11, 2, 4, 17, 2], "common fields");
    assert_eq!(&values[5..7], &[30, 80], "tf x10, sf x100");
    assert_eq!(*values.last().unwrap(), 45, "grating angle closes the header");
    assert_eq!(rig.flow.header().fields().len(), values.len() + 2);
}

#[test]
fn single_condition_bar_holds_then_drifts_at_speed() {
    let program = DriftingBar {
        bar: BarParams {
            speed: 8.0,
            move_area: 10.0,
            ..BarParams::default()
        },
    };
    let design = ExperimentDesign {
        trials: 1,
        pre_duration: 0.25,
        post_duration: 0.25,
        ..ExperimentDesign::default()
    };
    let (mut rig, _) = rig(program, design, direction(0), 0);
    assert_eq!(rig.flow.state.times.pre_dur, 0.25 + 10.0 / 8.0);
    assert_eq!(rig.flow.state.times.sti, 0.25 + 10.0 / 8.0 + 0.25);

    rig.flow.update(&mut rig.stimuli);
    let start = rig.stimuli[0].world;
    assert!(start.approx_eq(&Transform::translation(-5.0, 0.0), 1e-9));

    rig.clock.advance_secs(0.2);
    rig.flow.update(&mut rig.stimuli);
    assert_eq!(rig.stimuli[0].world, start, "no motion inside the pre window");
    assert!(rig.stimuli[0].visible);

    rig.clock.advance_secs(0.3);
    rig.flow.update(&mut rig.stimuli);
    let (x, y) = rig.stimuli[0].world.origin();
    assert!((x - (-5.0 + 0.25 * 8.0)).abs() < 1e-9, "moved (elapsed - pre) * speed");
    assert!(y.abs() < 1e-9);

    // frozen and visible through the post window
    rig.clock.advance_secs(1.1);
    rig.flow.update(&mut rig.stimuli);
    let frozen = rig.stimuli[0].world;
    rig.clock.advance_secs(0.1);
    rig.flow.update(&mut rig.stimuli);
    assert_eq!(rig.stimuli[0].world, frozen);
    assert!(rig.stimuli[0].visible);
}

#[test]
fn blank_slot_stays_hidden_and_still_marks() {
    let (mut rig, port) = rig(DriftingBar::default(), quick_design(3), direction(4), 21);
    let mut previous = rig.stimuli[0].world;
    let mut blank_frames = 0;
    loop {
        let active = rig.flow.update(&mut rig.stimuli);
        if let Some(open) = rig.flow.log.records.last().filter(|r| r.offset_s.is_none()) {
            if open.blank {
                blank_frames += 1;
                assert!(!rig.stimuli[0].visible, "blank slot must stay hidden");
                assert_eq!(rig.stimuli[0].world, previous, "blank slot must not move the bar");
            }
        }
        previous = rig.stimuli[0].world;
        if !active {
            break;
        }
        rig.clock.advance_secs(FRAME);
    }

    let blanks: Vec<_> = rig.flow.log.records.iter().filter(|r| r.blank).collect();
    assert_eq!(blanks.len(), 3, "one blank per trial");
    assert!(blanks.iter().all(|r| r.value == 0 && r.offset_s.is_some()));
    assert!(blank_frames > 0);
    assert_eq!(port.trigger_count(), 2 * 15);
}

#[test]
fn repeated_updates_at_one_instant_settle_after_one_call() {
    let (mut rig, port) = rig(DriftingBar::default(), quick_design(2), direction(2), 8);
    loop {
        rig.flow.update(&mut rig.stimuli);
        let armed = rig.flow.state.sti_on;
        let pulses = port.trigger_count();

        let settled = rig.flow.update(&mut rig.stimuli);
        assert_eq!(
            port.trigger_count(),
            pulses + usize::from(armed),
            "only a pending onset fires"
        );
        let state = rig.flow.state.clone();
        let pulses = port.trigger_count();
        let stimuli = rig.stimuli.clone();

        for _ in 0..3 {
            let again = rig.flow.update(&mut rig.stimuli);
            assert_eq!(again, settled);
            assert_eq!(rig.flow.state, state, "counters and latches are stable");
            assert_eq!(port.trigger_count(), pulses, "no extra trigger");
            assert_eq!(rig.stimuli, stimuli);
        }
        if !settled {
            break;
        }
        rig.clock.advance_secs(FRAME);
    }
    assert_eq!(rig.flow.state.onsets, 6);
}

#[test]
fn rested_programs_never_pair_offset_and_onset() {
    let design = ExperimentDesign {
        inter_trial_rest: 0.0,
        inter_stimulus_rest: 0.0,
        ..quick_design(2)
    };
    for program in every_program().into_iter().filter(|p| !p.zero_gap()) {
        let name = format!("{:?}", program.experiment_type());
        let (mut rig, port) = rig(program, design.clone(), direction(2), 9);
        let mut before = 0;
        loop {
            let active = rig.flow.update(&mut rig.stimuli);
            let pulses = port.trigger_count();
            assert!(pulses - before <= 1, "{name}: one marker per update");
            before = pulses;
            if !active {
                break;
            }
            rig.clock.advance_secs(FRAME);
        }
        let per_trial = program.stimuli_per_trial(&direction(2));
        assert_eq!(rig.flow.state.onsets, 2 * per_trial, "{name}");
    }
}

#[test]
fn zero_gap_program_presents_back_to_back() {
    let design = ExperimentDesign {
        trials: 2,
        stimulus_duration: 0.05,
        inter_stimulus_rest: 1.0,
        inter_trial_rest: 1.0,
        ..ExperimentDesign::default()
    };
    let condition = Condition::single(ConditionParameter::Orientation);
    let (mut rig, port) = rig(small_grid(), design, condition, 4);
    rig.run();

    let records = &rig.flow.log.records;
    assert_eq!(records.len(), 2 * 18);
    for pair in records.windows(2) {
        assert_eq!(
            pair[0].offset_s,
            Some(pair[1].onset_s),
            "next onset fires in the same update as the offset"
        );
    }
    assert_eq!(port.trigger_count(), 2 * 36);
}

#[test]
fn run_ends_on_the_last_offset() {
    let (mut rig, _) = rig(DriftingGrating::default(), quick_design(2), direction(0), 1);
    rig.run();
    assert!(!rig.flow.is_active());
    let last = rig.flow.log.records.last().unwrap();
    assert_eq!(
        last.offset_s,
        Some(rig.flow.run_seconds()),
        "no trailing rest after the final offset"
    );
}

struct DeadPort;

impl MarkerPort for DeadPort {
    fn encode(&mut self, _value: i32) -> Result<(), MarkerError> {
        Err(std::io::Error::from(std::io::ErrorKind::NotConnected).into())
    }
    fn encode_separator(&mut self) -> Result<(), MarkerError> {
        self.encode(0)
    }
    fn encode_end(&mut self) -> Result<(), MarkerError> {
        self.encode(0)
    }
    fn trigger(&mut self) -> Result<(), MarkerError> {
        self.encode(0)
    }
}

#[test]
fn dead_marker_port_never_stops_presentation() {
    let mut rig = rig_with_port(DriftingBar::default(), quick_design(2), direction(4), 2, DeadPort);
    assert!(rig.flow.markers.is_degraded());
    rig.run();
    assert_eq!(rig.flow.state.onsets, 10);
    assert_eq!(rig.flow.state.offsets, 10);
}

#[test]
fn abort_fires_only_the_onset_in_progress() {
    let (mut rig, port) = rig(DriftingBar::default(), quick_design(3), direction(4), 5);
    for _ in 0..10 {
        rig.flow.update(&mut rig.stimuli);
        rig.clock.advance_secs(FRAME);
    }
    let pulses = port.trigger_count();
    rig.flow.abort(&mut rig.stimuli);
    assert!(!rig.flow.update(&mut rig.stimuli));
    assert_eq!(port.trigger_count(), pulses);
    assert_eq!(pulses, 1);
    assert!(rig.stimuli.iter().all(|s| !s.visible));
    assert_eq!(rig.flow.log.records.last().unwrap().offset_s, None);
}
