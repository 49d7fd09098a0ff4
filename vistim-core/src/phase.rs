/// Phase boundaries of one presentation, in seconds since onset.
///
/// `pre <= pre_dur <= sti` holds for every program.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseTimes {
    /// `preT`
    pub pre: f64,
    /// `PreDurTime`: end of motion
    pub pre_dur: f64,
    /// `StiTime`: offset
    pub sti: f64,
}

impl PhaseTimes {
    pub fn new(pre: f64, motion: f64, post: f64) -> Self {
        let pre_dur = pre + motion;
        Self {
            pre,
            pre_dur,
            sti: pre_dur + post,
        }
    }

    /// Presentation without a separate pre or post window.
    pub fn fixed(sti: f64) -> Self {
        Self {
            pre: 0.0,
            pre_dur: sti,
            sti,
        }
    }
}
