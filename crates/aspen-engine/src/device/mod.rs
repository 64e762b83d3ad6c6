//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the window
//! surface and hands out one encoder + view per frame. Device limits are
//! checked against what the shader pipelines need before anything is drawn.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
