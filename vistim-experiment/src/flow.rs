use crate::kinematics::{Cue, Kinematics, align_condition, hide_all};
use crate::sequencer::RandomSequencer;
use crate::trial::{PresentationLog, Progress};
use tracing::{debug, info, warn};
use vistim_core::{Condition, Display, ExperimentDesign, PhaseTimes, Stimulus};
use vistim_marker::{MarkerChannel, MarkerHeader, MarkerPort};
use vistim_timing::{PhaseTimer, Timer};

/// Counters and one-shot latches of a run. Rebuilt by [`ExperimentFlow::set_flow`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowState {
    pub trial: usize,
    pub stimulus: usize,
    /// Seconds since the current onset
    pub elapsed: f64,
    /// Onset pending
    pub sti_on: bool,
    /// Slot geometry applied
    pub pred: bool,
    /// Offset fired
    pub rested: bool,
    /// Blank slot hidden
    pub blanked: bool,
    pub active: bool,
    pub onsets: usize,
    pub offsets: usize,
    pub per_trial: usize,
    pub times: PhaseTimes,
}

/// Per-frame state machine driving one run of a stimulus program.
///
/// Wiring is `set_flow` once, `mark_head` once, then one `update` per frame
/// until it returns `false`.
pub struct ExperimentFlow<K, T, P>
where
    K: Kinematics,
    T: Timer,
    P: MarkerPort,
{
    pub program: K,
    pub design: ExperimentDesign,
    pub condition: Condition,
    pub display: Display,
    pub sequencer: RandomSequencer,
    pub markers: MarkerChannel<P>,
    pub state: FlowState,
    pub log: PresentationLog,
    fixed_seed: Option<u64>,
    clock: PhaseTimer<T>,
    run_start: Option<T::Timestamp>,
}

impl<K, T, P> ExperimentFlow<K, T, P>
where
    K: Kinematics,
    T: Timer,
    P: MarkerPort,
{
    pub fn new(
        program: K,
        design: ExperimentDesign,
        condition: Condition,
        display: Display,
        timer: T,
        markers: MarkerChannel<P>,
    ) -> Self {
        Self {
            program,
            design,
            condition,
            display,
            sequencer: RandomSequencer::new(),
            markers,
            state: FlowState::default(),
            log: PresentationLog::default(),
            fixed_seed: None,
            clock: PhaseTimer::new(timer),
            run_start: None,
        }
    }

    /// Replay a run from a logged seed instead of drawing a fresh one.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.fixed_seed = seed;
        self
    }

    /// Derives phase windows and the per-trial count, and clears all counters.
    /// A zero trial count runs one trial, and the condition key is moved to
    /// the axis the program varies.
    pub fn set_flow(&mut self) {
        if self.design.trials == 0 {
            warn!("trial count was 0, running 1");
            self.design.trials = 1;
        }
        if let Some(replaced) = align_condition(&self.program, &mut self.condition) {
            warn!(
                ?replaced,
                parameter = ?self.condition.parameter,
                "condition parameter is not varied by this program"
            );
        }
        let times = self.program.phase_times(&self.design);
        let per_trial = self.program.stimuli_per_trial(&self.condition);
        self.state = FlowState {
            per_trial,
            times,
            ..FlowState::default()
        };
        self.clock.reset();
        debug!(?times, per_trial, "flow set");
    }

    pub fn header(&self) -> MarkerHeader {
        let mut header = MarkerHeader {
            experiment_type: self.program.experiment_type().code(),
            condition_key: self.condition.parameter.code(),
            levels: self.condition.levels as i32,
            seed: i32::try_from(self.sequencer.seed()).unwrap_or(i32::MAX),
            trials: self.design.trials as i32,
            params: Vec::new(),
        };
        self.program
            .encode_params(&self.condition, &self.display, &mut header);
        header
    }

    /// Seeds the sequencer, sends the marker header and arms the first stimulus.
    pub fn mark_head(&mut self) {
        let seed = match self.fixed_seed {
            Some(seed) => {
                self.sequencer.set_seed(seed);
                seed
            }
            None => self.sequencer.randomize_seed(),
        };
        self.sequencer.randomize_sequence(self.state.per_trial);

        let header = self.header();
        self.markers.send_header(&header);

        self.log = PresentationLog {
            seed,
            records: Vec::new(),
        };
        self.run_start = Some(self.clock.timer().now());
        self.state.sti_on = true;
        self.state.active = self.state.per_trial > 0 && self.design.trials > 0;
        info!(
            program = ?self.program.experiment_type(),
            seed,
            trials = self.design.trials,
            per_trial = self.state.per_trial,
            "run armed"
        );
    }

    /// One frame. Returns whether the run is still active.
    ///
    /// After a rest the next onset fires on the following call. Zero-gap
    /// programs re-arm and fire within the same call.
    pub fn update<S: Stimulus>(&mut self, stimuli: &mut [S]) -> bool {
        while self.state.active {
            if self.state.sti_on {
                self.fire_onset();
            }

            let elapsed = self.clock.elapsed_seconds();
            self.state.elapsed = elapsed;
            let times = self.state.times;
            let value = self.current_value();
            let blank = self.is_blank(value);

            if elapsed < times.sti {
                let cue = Cue {
                    condition: &self.condition,
                    value,
                };
                if blank {
                    if !self.state.blanked {
                        self.state.blanked = true;
                        hide_all(stimuli);
                    }
                } else {
                    if !self.state.pred {
                        self.state.pred = true;
                        self.program.arrange(cue, stimuli);
                    }
                    if elapsed > times.pre && elapsed < times.pre_dur {
                        self.program.advance(cue, elapsed - times.pre, stimuli);
                    }
                }
                return true;
            }

            if !self.state.rested {
                self.fire_offset(stimuli);
            }

            let zero_gap = self.program.zero_gap();
            if self.state.stimulus + 1 < self.state.per_trial {
                if zero_gap || elapsed > times.sti + self.design.inter_stimulus_rest {
                    self.state.stimulus += 1;
                    self.rearm(stimuli);
                    if zero_gap {
                        continue;
                    }
                }
                return true;
            }

            if self.state.trial + 1 < self.design.trials {
                if zero_gap || elapsed > times.sti + self.design.inter_trial_rest {
                    self.sequencer.randomize_sequence(self.state.per_trial);
                    self.state.trial += 1;
                    self.state.stimulus = 0;
                    self.rearm(stimuli);
                    info!(trial = self.state.trial, "trial started");
                    if zero_gap {
                        continue;
                    }
                }
                return true;
            }

            self.state.active = false;
            info!(
                onsets = self.state.onsets,
                offsets = self.state.offsets,
                "run complete"
            );
        }
        false
    }

    /// Stops the run where it stands and hides everything. No offset marker is
    /// sent, so the open record keeps no offset.
    pub fn abort<S: Stimulus>(&mut self, stimuli: &mut [S]) {
        if self.state.active {
            self.state.active = false;
            hide_all(stimuli);
            info!(
                trial = self.state.trial,
                stimulus = self.state.stimulus,
                "run aborted"
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn progress(&self) -> Progress {
        Progress {
            trial: self.state.trial,
            trials: self.design.trials,
            stimulus: self.state.stimulus,
            stimuli: self.state.per_trial,
        }
    }

    pub fn timer(&self) -> &T {
        self.clock.timer()
    }

    pub fn timer_mut(&mut self) -> &mut T {
        self.clock.timer_mut()
    }

    /// Seconds since the header was sent.
    pub fn run_seconds(&self) -> f64 {
        self.run_start
            .map_or(0.0, |ts| self.clock.timer().elapsed(ts).as_secs_f64())
    }

    fn current_value(&self) -> usize {
        self.sequencer.get(self.state.stimulus).unwrap_or(0)
    }

    fn is_blank(&self, value: usize) -> bool {
        value == 0 && self.program.has_blank(&self.condition)
    }

    fn fire_onset(&mut self) {
        self.state.sti_on = false;
        self.clock.restart();
        self.markers.trigger();
        self.state.onsets += 1;

        let value = self.current_value();
        let blank = self.is_blank(value);
        let at = self.run_seconds();
        self.log
            .open(self.state.trial, self.state.stimulus, value, blank, at);
        debug!(
            trial = self.state.trial,
            stimulus = self.state.stimulus,
            value,
            blank,
            at,
            "onset"
        );
    }

    fn fire_offset<S: Stimulus>(&mut self, stimuli: &mut [S]) {
        self.state.rested = true;
        hide_all(stimuli);
        self.markers.trigger();
        self.state.offsets += 1;

        let at = self.run_seconds();
        self.log.close(at);
        debug!(
            trial = self.state.trial,
            stimulus = self.state.stimulus,
            at,
            "offset"
        );
    }

    fn rearm<S: Stimulus>(&mut self, stimuli: &mut [S]) {
        self.state.sti_on = true;
        self.state.pred = false;
        self.state.rested = false;
        self.state.blanked = false;
        self.program.rewind(stimuli);
    }
}
