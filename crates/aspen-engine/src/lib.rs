//! Aspen engine crate.
//!
//! GLSL shader variants for instanced 2D drawing, the host-side contract
//! that feeds them (uniform layouts, specialization, bindings), wgpu
//! renderers per variant, and the window/GPU runtime driving them.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod mesh;
pub mod reference;
pub mod render;
pub mod shader;
pub mod uniforms;
