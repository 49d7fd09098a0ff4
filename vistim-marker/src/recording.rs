use crate::error::MarkerError;
use crate::port::MarkerPort;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    Value(i32),
    Separator,
    End,
    Trigger,
}

/// In-memory port. Clones share one event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPort {
    events: Arc<Mutex<Vec<MarkerEvent>>>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<MarkerEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<MarkerEvent> {
        self.log().clone()
    }

    pub fn trigger_count(&self) -> usize {
        self.log()
            .iter()
            .filter(|e| matches!(e, MarkerEvent::Trigger))
            .count()
    }

    /// Header integers in send order, separators skipped.
    pub fn header_values(&self) -> Vec<i32> {
        self.log()
            .iter()
            .filter_map(|e| match e {
                MarkerEvent::Value(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

impl MarkerPort for RecordingPort {
    fn encode(&mut self, value: i32) -> Result<(), MarkerError> {
        self.log().push(MarkerEvent::Value(value));
        Ok(())
    }

    fn encode_separator(&mut self) -> Result<(), MarkerError> {
        self.log().push(MarkerEvent::Separator);
        Ok(())
    }

    fn encode_end(&mut self) -> Result<(), MarkerError> {
        self.log().push(MarkerEvent::End);
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), MarkerError> {
        self.log().push(MarkerEvent::Trigger);
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl MarkerPort for NullPort {
    fn encode(&mut self, _value: i32) -> Result<(), MarkerError> {
        Ok(())
    }

    fn encode_separator(&mut self) -> Result<(), MarkerError> {
        Ok(())
    }

    fn encode_end(&mut self) -> Result<(), MarkerError> {
        Ok(())
    }

    fn trigger(&mut self) -> Result<(), MarkerError> {
        Ok(())
    }
}
