use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("bar of {width}x{height} degrees has no area")]
    EmptyBar { width: f32, height: f32 },
    #[error("grating aperture of {0} degrees has no area")]
    EmptyAperture(f32),
}
