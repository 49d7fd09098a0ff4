use serde::{Deserialize, Serialize};

/// One stimulus presentation as it actually ran. Times are seconds since the
/// marker header finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationRecord {
    pub trial: usize,
    pub stimulus: usize,
    /// Permutation value shown in this slot
    pub value: usize,
    pub blank: bool,
    pub onset_s: f64,
    /// `None` when the run was aborted mid-presentation
    pub offset_s: Option<f64>,
}
