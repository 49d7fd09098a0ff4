use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Trait for monotonic, high-precision timers
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync + std::fmt::Debug;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn calibration_stats(&self) -> CalibrationStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl CalibrationStats {
    fn from_frames(frames: &VecDeque<Duration>) -> Self {
        if frames.is_empty() {
            return Self::default();
        }
        let times: Vec<f64> = frames.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        CalibrationStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

fn push_frame(frames: &mut VecDeque<Duration>, max_samples: usize, d: Duration) {
    if frames.len() >= max_samples {
        frames.pop_front();
    }
    frames.push_back(d);
}

/// Wall-clock timer backed by `Instant`, with platform-specific precise sleep.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
    pub frame_times: VecDeque<Duration>,
    pub max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn record_frame(&mut self, d: Duration) {
        push_frame(&mut self.frame_times, self.max_samples, d);
    }
    fn calibration_stats(&self) -> CalibrationStats {
        CalibrationStats::from_frames(&self.frame_times)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame_times: VecDeque::with_capacity(1000),
            max_samples: 1000,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        self.spin_sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and the remainder pointer may be null.
        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }

    // Short waits spin; the scheduler cannot wake us with sub-100us accuracy.
    #[cfg(not(target_os = "linux"))]
    fn spin_sleep(&self, duration: Duration) {
        if duration.as_nanos() < 100_000 {
            let start = Instant::now();
            while start.elapsed() < duration {
                std::hint::spin_loop();
            }
        } else {
            std::thread::sleep(duration);
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated clock. Clones share the same time source, and `sleep` advances it
/// instead of blocking, so marker pulse trains run instantly under test.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    frame_times: VecDeque<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    pub fn set_secs(&self, secs: f64) {
        self.now_ns
            .store(Duration::from_secs_f64(secs).as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn now_secs(&self) -> f64 {
        self.now_ns.load(Ordering::SeqCst) as f64 / 1e9
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn record_frame(&mut self, d: Duration) {
        push_frame(&mut self.frame_times, 1000, d);
    }
    fn calibration_stats(&self) -> CalibrationStats {
        CalibrationStats::from_frames(&self.frame_times)
    }
}
