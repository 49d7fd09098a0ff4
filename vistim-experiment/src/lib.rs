pub mod config;
pub mod error;
pub mod flow;
pub mod kinematics;
pub mod programs;
pub mod sequencer;
pub mod trial;
pub use config::{ConditionConfig, ExperimentConfig};
pub use error::{ConfigError, LogError};
pub use flow::{ExperimentFlow, FlowState};
pub use kinematics::{Cue, Kinematics};
pub use programs::StimulusProgram;
pub use sequencer::RandomSequencer;
pub use trial::{PresentationLog, Progress};
