use crate::error::LogError;
use serde::Serialize;
use std::path::Path;
use vistim_core::PresentationRecord;

/// Every presentation of a run, in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresentationLog {
    pub seed: u64,
    pub records: Vec<PresentationRecord>,
}

impl PresentationLog {
    pub fn open(&mut self, trial: usize, stimulus: usize, value: usize, blank: bool, onset_s: f64) {
        self.records.push(PresentationRecord {
            trial,
            stimulus,
            value,
            blank,
            onset_s,
            offset_s: None,
        });
    }

    /// Stamps the offset on the newest open record.
    pub fn close(&mut self, offset_s: f64) {
        if let Some(last) = self.records.last_mut().filter(|r| r.offset_s.is_none()) {
            last.offset_s = Some(offset_s);
        }
    }

    pub fn completed(&self) -> usize {
        self.records.iter().filter(|r| r.offset_s.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String, LogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| LogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Counter snapshot shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub trial: usize,
    pub trials: usize,
    pub stimulus: usize,
    pub stimuli: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} Trials\n{} / {} Stimuli",
            self.trial, self.trials, self.stimulus, self.stimuli
        )
    }
}
