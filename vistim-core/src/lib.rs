pub mod condition;
pub mod design;
pub mod display;
pub mod phase;
pub mod stimulus;
pub mod transform;
pub mod trial;

pub use condition::{Condition, ConditionParameter};
pub use design::{ExperimentDesign, ExperimentType};
pub use display::Display;
pub use phase::PhaseTimes;
pub use stimulus::{
    BarParams, GratingParams, GratingType, Stimulus, StimulusSpec, StimulusState,
};
pub use transform::Transform;
pub use trial::PresentationRecord;
