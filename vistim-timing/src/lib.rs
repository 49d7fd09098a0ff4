pub mod phase_timer;
pub mod timer;

pub use phase_timer::PhaseTimer;
pub use timer::{CalibrationStats, HighPrecisionTimer, ManualTimer, Timer};
