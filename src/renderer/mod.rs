//! WebGPU rendering module
//!
//! The lab is drawn as world-space triangles with a single pipeline:
//! one uniform (view-projection + camera), a depth buffer and optional MSAA.

pub mod frame;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use frame::{Frame, FrameBuilder, FrameSink};
pub use pipeline::RenderState;
pub use vertex::Vertex;

use thiserror::Error;

/// Failures while bringing up the page or the GPU
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no browser window")]
    NoWindow,
    #[error("element #{0} is missing")]
    MissingElement(&'static str),
    #[error("failed to create the render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create the GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface supports no texture formats")]
    NoSurfaceFormat,
}
