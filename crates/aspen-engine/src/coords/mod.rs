//! Viewport geometry shared by the runtime and the renderers.
//!
//! Shaders work in clip space directly; the host only needs the drawable size
//! to derive the aspect terms it uploads.

mod viewport;

pub use viewport::Viewport;
