use crate::Timer;

/// Stopwatch over a [`Timer`]: elapsed seconds since the last (re)start.
///
/// `reset` stops the watch and zeroes it; `restart` zeroes and starts it. A
/// stopped watch reads zero.
#[derive(Debug, Clone)]
pub struct PhaseTimer<T: Timer> {
    timer: T,
    started: Option<T::Timestamp>,
}

impl<T: Timer> PhaseTimer<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            started: None,
        }
    }

    pub fn reset(&mut self) {
        self.started = None;
    }

    pub fn restart(&mut self) {
        self.started = Some(self.timer.now());
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.started
            .map_or(0.0, |ts| self.timer.elapsed(ts).as_secs_f64())
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualTimer;

    #[test]
    fn stopped_watch_reads_zero() {
        let clock = ManualTimer::new();
        let watch = PhaseTimer::new(clock.clone());
        clock.advance_secs(3.0);
        assert_eq!(watch.elapsed_seconds(), 0.0);
    }

    #[test]
    fn restart_measures_from_now() {
        let clock = ManualTimer::new();
        let mut watch = PhaseTimer::new(clock.clone());
        watch.restart();
        clock.advance_secs(1.5);
        assert!((watch.elapsed_seconds() - 1.5).abs() < 1e-9);

        watch.restart();
        clock.advance_secs(0.25);
        assert!((watch.elapsed_seconds() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn reset_stops_the_watch() {
        let clock = ManualTimer::new();
        let mut watch = PhaseTimer::new(clock.clone());
        watch.restart();
        clock.advance_secs(1.0);
        watch.reset();
        assert_eq!(watch.elapsed_seconds(), 0.0);
        clock.advance_secs(1.0);
        assert_eq!(watch.elapsed_seconds(), 0.0, "a reset watch stays at zero");
    }
}
