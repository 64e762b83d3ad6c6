//! GLSL shader kernels and the host-side pieces needed to finalize them.
//!
//! The crate ships one fragment shader and three vertex shader variants:
//! - `passthrough.frag`: writes the interpolated color with alpha forced to 1
//! - `offset_scale.vert`: per-object offset/scale, fixed 64-entry object array
//! - `matrix.vert`: per-object 4x4 transform composed with view/projection
//! - `pulse.vert`: offset/scale geometry with a time-driven color pulse
//!
//! Variants sized by the `NUM_OBJECTS` specialization constant are finalized on
//! the host (see [`specialize`]) before being handed to the wgpu GLSL front end.

mod error;
pub mod interface;
mod kind;
mod specialize;

pub use error::ShaderError;
pub use kind::ShaderKind;
pub use specialize::{declarations, specialize, SpecConstant, SpecDeclaration, SpecType, SpecValue};
