pub mod error;
pub mod render;
pub mod stimulus;

pub use error::RenderError;
pub use render::{FrameStats, SkiaRenderer, view_transform};
pub use stimulus::{SkiaBar, SkiaGrating, SkiaStimulus, build_stimuli};
