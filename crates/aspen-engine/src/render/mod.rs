//! GPU rendering subsystem.
//!
//! One renderer per vertex-shader variant, all sharing `passthrough.frag`.
//! Each renderer owns its GPU resources (pipeline, uniform buffers, mesh buffers)
//! and creates them lazily on first use or when the surface format changes.
//!
//! Convention:
//! - meshes are authored directly in the shaders' input space
//! - one instanced indexed draw per `render` call, instance `i` reads object `i`
//! - instance counts never exceed the shader's object array length

mod common;
mod ctx;
pub mod matrix;
pub mod offset_scale;
pub mod pulse;

pub use common::RendererConfig;
pub use ctx::{RenderCtx, RenderTarget};
pub use matrix::MatrixRenderer;
pub use offset_scale::OffsetScaleRenderer;
pub use pulse::PulseRenderer;
