//! Host-side mirrors of the GLSL uniform blocks.
//!
//! Every struct is `#[repr(C)]` + `Pod` and matches the std140 layout the shaders
//! declare, byte for byte. Padding fields exist only where std140 inserts gaps.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::shader::interface::OFFSET_SCALE_OBJECTS;

// ── offset/scale objects (offset_scale.vert, pulse.vert) ─────────────────

/// `PerObject { vec2 offset; vec2 scale; vec3 color_offset; }`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct OffsetScaleObject {
    pub offset: [f32; 2],
    pub scale: [f32; 2],
    pub color_offset: [f32; 3],
    pub _pad: f32,
}

impl OffsetScaleObject {
    #[inline]
    pub fn new(offset: Vec2, scale: Vec2, color_offset: Vec3) -> Self {
        Self {
            offset: offset.to_array(),
            scale: scale.to_array(),
            color_offset: color_offset.to_array(),
            _pad: 0.0,
        }
    }
}

// ── offset_scale.vert ────────────────────────────────────────────────────

/// Leading fields of the `offset_scale.vert` block, including the `_0`/`_1` padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct OffsetScaleHeader {
    pub aspect_ratio: f32,
    pub viewport_scale: f32,
    pub viewport_offset: [f32; 2],
    pub _0: [f32; 2],
    pub _1: [f32; 2],
}

impl OffsetScaleHeader {
    #[inline]
    pub fn new(aspect_ratio: f32, viewport_scale: f32, viewport_offset: Vec2) -> Self {
        Self {
            aspect_ratio,
            viewport_scale,
            viewport_offset: viewport_offset.to_array(),
            _0: [0.0; 2],
            _1: [0.0; 2],
        }
    }
}

/// Whole `offset_scale.vert` block (fixed 64-entry array).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct OffsetScaleBlock {
    pub header: OffsetScaleHeader,
    pub objects: [OffsetScaleObject; OFFSET_SCALE_OBJECTS as usize],
}

impl OffsetScaleBlock {
    /// Builds the block, zero-filling unused entries.
    ///
    /// Objects past the array length are dropped; the caller decides whether
    /// that deserves a diagnostic.
    pub fn new(header: OffsetScaleHeader, objects: &[OffsetScaleObject]) -> Self {
        let mut block = Self {
            header,
            objects: [OffsetScaleObject::default(); OFFSET_SCALE_OBJECTS as usize],
        };
        let n = objects.len().min(block.objects.len());
        block.objects[..n].copy_from_slice(&objects[..n]);
        block
    }
}

// ── pulse.vert ───────────────────────────────────────────────────────────

/// Leading fields of the `pulse.vert` block.
///
/// The shader declares no padding; `_pad` mirrors the gap std140 leaves before
/// the 16-byte aligned object array.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PulseHeader {
    pub aspect_ratio: f32,
    pub viewport_scale: f32,
    pub viewport_offset: [f32; 2],
    pub time: f32,
    pub _pad: [f32; 3],
}

impl PulseHeader {
    #[inline]
    pub fn new(aspect_ratio: f32, viewport_scale: f32, viewport_offset: Vec2, time: f32) -> Self {
        Self {
            aspect_ratio,
            viewport_scale,
            viewport_offset: viewport_offset.to_array(),
            time,
            _pad: [0.0; 3],
        }
    }
}

// ── matrix.vert ──────────────────────────────────────────────────────────

/// `PassData { mat4 view; mat4 proj; }` (set 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewProj {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl ViewProj {
    #[inline]
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        }
    }
}

impl Default for ViewProj {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// `PerObject { mat4 transform; vec3 color_offset; }` (set 3).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MatrixObject {
    pub transform: [[f32; 4]; 4],
    pub color_offset: [f32; 3],
    pub _pad: f32,
}

impl MatrixObject {
    #[inline]
    pub fn new(transform: Mat4, color_offset: Vec3) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            color_offset: color_offset.to_array(),
            _pad: 0.0,
        }
    }
}

impl Default for MatrixObject {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec3::ZERO)
    }
}

// ── specialization-sized blocks ──────────────────────────────────────────

/// Byte image of a block whose object array has `capacity` entries.
///
/// `objects` beyond `capacity` are dropped; missing entries are zeroed so the
/// upload always covers the full declared array.
pub fn sized_block<H: Pod, O: Pod>(header: Option<&H>, objects: &[O], capacity: usize) -> Vec<u8> {
    let header_len = header.map_or(0, |_| size_of::<H>());
    let mut bytes = vec![0u8; header_len + capacity * size_of::<O>()];
    if let Some(h) = header {
        bytes[..header_len].copy_from_slice(bytemuck::bytes_of(h));
    }
    let n = objects.len().min(capacity);
    let body: &[u8] = bytemuck::cast_slice(&objects[..n]);
    bytes[header_len..header_len + body.len()].copy_from_slice(body);
    bytes
}

// std140 layout guards.
const _: () = {
    assert!(size_of::<OffsetScaleObject>() == 32);
    assert!(offset_of!(OffsetScaleObject, color_offset) == 16);
    assert!(size_of::<OffsetScaleHeader>() == 32);
    assert!(offset_of!(OffsetScaleHeader, viewport_offset) == 8);
    assert!(size_of::<OffsetScaleBlock>() == 32 + 64 * 32);
    assert!(offset_of!(OffsetScaleBlock, objects) == 32);
    assert!(size_of::<PulseHeader>() == 32);
    assert!(offset_of!(PulseHeader, time) == 16);
    assert!(size_of::<ViewProj>() == 128);
    assert!(offset_of!(ViewProj, proj) == 64);
    assert!(size_of::<MatrixObject>() == 80);
    assert!(offset_of!(MatrixObject, color_offset) == 64);
};
