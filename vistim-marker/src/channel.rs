use crate::error::MarkerError;
use crate::header::MarkerHeader;
use crate::port::MarkerPort;
use tracing::{trace, warn};

/// Fire-and-forget front of a marker port.
///
/// The first port error is logged once and the channel degrades to a no-op
/// sink for the rest of the run. Presentation never stops for telemetry.
#[derive(Debug)]
pub enum MarkerChannel<P: MarkerPort> {
    Live(P),
    Degraded,
}

impl<P: MarkerPort> MarkerChannel<P> {
    pub fn new(port: P) -> Self {
        MarkerChannel::Live(port)
    }

    /// Channel for a port that failed to open.
    pub fn degraded(reason: &MarkerError) -> Self {
        warn!(error = %reason, "marker port unavailable, markers disabled");
        MarkerChannel::Degraded
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, MarkerChannel::Degraded)
    }

    fn run(&mut self, what: &str, op: impl FnOnce(&mut P) -> Result<(), MarkerError>) {
        if let MarkerChannel::Live(port) = self {
            if let Err(e) = op(port) {
                warn!(error = %e, during = what, "marker port failed, markers disabled");
                *self = MarkerChannel::Degraded;
            }
        }
    }

    pub fn send_header(&mut self, header: &MarkerHeader) {
        self.run("header", |port| header.send(port));
    }

    pub fn trigger(&mut self) {
        trace!("trigger");
        self.run("trigger", |port| port.trigger());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingPort;

    struct FlakyPort {
        ok_calls: usize,
    }

    impl FlakyPort {
        fn step(&mut self) -> Result<(), MarkerError> {
            if self.ok_calls == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into());
            }
            self.ok_calls -= 1;
            Ok(())
        }
    }

    impl MarkerPort for FlakyPort {
        fn encode(&mut self, _value: i32) -> Result<(), MarkerError> {
            self.step()
        }
        fn encode_separator(&mut self) -> Result<(), MarkerError> {
            self.step()
        }
        fn encode_end(&mut self) -> Result<(), MarkerError> {
            self.step()
        }
        fn trigger(&mut self) -> Result<(), MarkerError> {
            self.step()
        }
    }

    #[test]
    fn first_failure_degrades_for_good() {
        let mut ch = MarkerChannel::new(FlakyPort { ok_calls: 1 });
        ch.trigger();
        assert!(!ch.is_degraded());
        ch.trigger();
        assert!(ch.is_degraded());
        ch.trigger();
        assert!(ch.is_degraded());
    }

    #[test]
    fn live_channel_forwards_triggers() {
        let rec = RecordingPort::new();
        let mut ch = MarkerChannel::new(rec.clone());
        ch.trigger();
        ch.trigger();
        assert_eq!(rec.trigger_count(), 2);
    }

    #[test]
    fn unopened_port_starts_degraded() {
        let err = MarkerError::Write(std::io::Error::from(std::io::ErrorKind::NotFound));
        let ch = MarkerChannel::<RecordingPort>::degraded(&err);
        assert!(ch.is_degraded());
    }
}
