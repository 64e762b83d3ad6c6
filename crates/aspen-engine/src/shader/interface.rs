//! Binding contract declared by the GLSL sources.
//!
//! Host code must match these exactly or the pipeline fails to bind. Renderers
//! build their bind-group and vertex layouts from these constants.

/// A descriptor-set/binding pair (`set` maps to a wgpu bind group index).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BindingSlot {
    pub set: u32,
    pub binding: u32,
}

impl BindingSlot {
    #[inline]
    pub const fn new(set: u32, binding: u32) -> Self {
        Self { set, binding }
    }
}

/// Vertex attribute `position: vec2`.
pub const POSITION_LOCATION: u32 = 0;
/// Vertex attribute `color: vec3`.
pub const COLOR_LOCATION: u32 = 1;
/// Vertex output / fragment input carrying the interpolated color.
pub const VARYING_COLOR_LOCATION: u32 = 0;
/// Fragment color target.
pub const FRAGMENT_OUTPUT_LOCATION: u32 = 0;

/// Specialization constant id of `NUM_OBJECTS`.
pub const NUM_OBJECTS_ID: u32 = 0;
/// Default value of `NUM_OBJECTS` when not specialized.
pub const DEFAULT_NUM_OBJECTS: u32 = 64;
/// Fixed object array length of `offset_scale.vert`.
pub const OFFSET_SCALE_OBJECTS: u32 = 64;

/// Frame data + objects of `offset_scale.vert`.
pub const OFFSET_SCALE_DATA: BindingSlot = BindingSlot::new(0, 0);
/// Frame data + objects of `pulse.vert`.
pub const PULSE_DATA: BindingSlot = BindingSlot::new(0, 0);
/// View/projection block of `matrix.vert`.
pub const MATRIX_PASS: BindingSlot = BindingSlot::new(1, 0);
/// Per-object transform block of `matrix.vert`.
pub const MATRIX_OBJECTS: BindingSlot = BindingSlot::new(3, 0);

/// Number of bind groups the matrix pipeline layout spans (sets 0..=3).
pub const MATRIX_SET_COUNT: u32 = MATRIX_OBJECTS.set + 1;

/// Smallest `max_uniform_buffer_binding_size` any wgpu device reports.
///
/// Object capacities are validated against this so a pipeline never depends on
/// a device with larger limits.
pub const MIN_UNIFORM_BINDING_SIZE: u64 = 16 << 10;
