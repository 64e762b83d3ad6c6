//! CPU evaluation of the shader kernels.
//!
//! Each function computes what the corresponding GLSL `main` writes for one
//! invocation, reading the same uniform structs the renderers upload. An
//! instance index outside the object array yields `None` where the GPU result
//! would be undefined.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::uniforms::{MatrixObject, OffsetScaleBlock, OffsetScaleObject, PulseHeader, ViewProj};

/// Per-vertex inputs (locations 0 and 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexInput {
    pub position: Vec2,
    pub color: Vec3,
}

impl VertexInput {
    #[inline]
    pub const fn new(position: Vec2, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// What a vertex shader writes: `gl_Position` and the color varying.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexOutput {
    pub clip: Vec4,
    pub color: Vec3,
}

/// `passthrough.frag`.
#[inline]
pub fn fragment_passthrough(color: Vec3) -> Vec4 {
    color.extend(1.0)
}

/// Color multiplier applied by `pulse.vert`: `abs(sin(time * 8)) + 0.5`.
#[inline]
pub fn pulse_factor(time: f32) -> f32 {
    (time * 8.0).sin().abs() + 0.5
}

/// Scale, offset, aspect correction, then the global viewport transform.
fn place(
    position: Vec2,
    object: &OffsetScaleObject,
    aspect_ratio: f32,
    viewport_scale: f32,
    viewport_offset: Vec2,
) -> Vec4 {
    let mut pos = position * Vec2::from(object.scale) + Vec2::from(object.offset);
    pos.x *= aspect_ratio;
    let pos = pos * viewport_scale + viewport_offset;
    Vec4::new(pos.x, pos.y, 0.0, 1.0)
}

/// `offset_scale.vert`.
pub fn offset_scale_vertex(
    input: VertexInput,
    block: &OffsetScaleBlock,
    instance: u32,
) -> Option<VertexOutput> {
    let object = block.objects.get(instance as usize)?;
    let h = &block.header;
    Some(VertexOutput {
        clip: place(
            input.position,
            object,
            h.aspect_ratio,
            h.viewport_scale,
            Vec2::from(h.viewport_offset),
        ),
        color: input.color + Vec3::from(object.color_offset),
    })
}

/// `pulse.vert`. `objects` is the specialized array (`NUM_OBJECTS` entries).
pub fn pulse_vertex(
    input: VertexInput,
    header: &PulseHeader,
    objects: &[OffsetScaleObject],
    instance: u32,
) -> Option<VertexOutput> {
    let object = objects.get(instance as usize)?;
    Some(VertexOutput {
        clip: place(
            input.position,
            object,
            header.aspect_ratio,
            header.viewport_scale,
            Vec2::from(header.viewport_offset),
        ),
        color: input.color + Vec3::from(object.color_offset) * pulse_factor(header.time),
    })
}

/// `matrix.vert`. `objects` is the specialized array (`NUM_OBJECTS` entries).
pub fn matrix_vertex(
    input: VertexInput,
    pass: &ViewProj,
    objects: &[MatrixObject],
    instance: u32,
) -> Option<VertexOutput> {
    let object = objects.get(instance as usize)?;
    let view = Mat4::from_cols_array_2d(&pass.view);
    let proj = Mat4::from_cols_array_2d(&pass.proj);
    let world_view = view * Mat4::from_cols_array_2d(&object.transform);
    Some(VertexOutput {
        clip: proj * world_view * Vec4::new(input.position.x, input.position.y, 0.0, 1.0),
        color: input.color + Vec3::from(object.color_offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::OffsetScaleHeader;

    const EPS: f32 = 1e-6;

    fn input() -> VertexInput {
        VertexInput::new(Vec2::new(0.5, -0.25), Vec3::new(0.1, 0.2, 0.3))
    }

    // ── fragment ──────────────────────────────────────────────────────────

    #[test]
    fn fragment_forces_opaque_alpha() {
        assert_eq!(
            fragment_passthrough(Vec3::new(0.2, 0.4, 0.6)),
            Vec4::new(0.2, 0.4, 0.6, 1.0)
        );
    }

    // ── pulse factor ──────────────────────────────────────────────────────

    #[test]
    fn pulse_factor_at_zero_is_half() {
        assert_eq!(pulse_factor(0.0), 0.5);
    }

    #[test]
    fn pulse_factor_peaks_at_one_and_a_half() {
        let t = std::f32::consts::FRAC_PI_2 / 8.0;
        assert!((pulse_factor(t) - 1.5).abs() < EPS);
        assert!((pulse_factor(-t) - 1.5).abs() < EPS);
    }

    #[test]
    fn pulse_factor_stays_in_range() {
        for i in 0..1000 {
            let f = pulse_factor(i as f32 * 0.013);
            assert!((0.5..=1.5 + EPS).contains(&f));
        }
    }

    // ── offset/scale ──────────────────────────────────────────────────────

    #[test]
    fn offset_scale_applies_object_then_viewport() {
        let object = OffsetScaleObject::new(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0), Vec3::new(0.5, 0.5, 0.5));
        let header = OffsetScaleHeader::new(0.5, 0.5, Vec2::new(0.1, -0.1));
        let block = OffsetScaleBlock::new(header, &[object]);

        let out = offset_scale_vertex(input(), &block, 0).unwrap();
        // position * scale + offset = (2.0, 1.0); x *= 0.5 -> (1.0, 1.0);
        // * 0.5 + (0.1, -0.1) -> (0.6, 0.4)
        assert!((out.clip - Vec4::new(0.6, 0.4, 0.0, 1.0)).abs().max_element() < EPS);
        assert!((out.color - Vec3::new(0.6, 0.7, 0.8)).abs().max_element() < EPS);
    }

    #[test]
    fn offset_scale_selects_by_instance() {
        let a = OffsetScaleObject::new(Vec2::ZERO, Vec2::ONE, Vec3::ZERO);
        let b = OffsetScaleObject::new(Vec2::new(1.0, 0.0), Vec2::ONE, Vec3::ONE);
        let block = OffsetScaleBlock::new(OffsetScaleHeader::new(1.0, 1.0, Vec2::ZERO), &[a, b]);

        let out = offset_scale_vertex(input(), &block, 1).unwrap();
        assert_eq!(out.clip.x, 1.5);
        assert_eq!(out.color, input().color + Vec3::ONE);
    }

    #[test]
    fn offset_scale_out_of_range_instance() {
        let block = OffsetScaleBlock::new(OffsetScaleHeader::default(), &[]);
        assert!(offset_scale_vertex(input(), &block, 63).is_some());
        assert!(offset_scale_vertex(input(), &block, 64).is_none());
    }

    // ── pulse ─────────────────────────────────────────────────────────────

    #[test]
    fn pulse_halves_color_offset_at_time_zero() {
        let object = OffsetScaleObject::new(Vec2::ZERO, Vec2::ONE, Vec3::new(1.0, 0.5, 0.2));
        let header = PulseHeader::new(1.0, 1.0, Vec2::ZERO, 0.0);

        let out = pulse_vertex(input(), &header, &[object], 0).unwrap();
        let expected = input().color + Vec3::new(0.5, 0.25, 0.1);
        assert!((out.color - expected).abs().max_element() < EPS);
    }

    #[test]
    fn pulse_geometry_matches_offset_scale() {
        let object = OffsetScaleObject::new(Vec2::new(0.3, 0.1), Vec2::splat(0.45), Vec3::ZERO);
        let block = OffsetScaleBlock::new(OffsetScaleHeader::new(0.75, 0.5, Vec2::new(0.2, 0.0)), &[object]);
        let header = PulseHeader::new(0.75, 0.5, Vec2::new(0.2, 0.0), 12.0);

        let a = offset_scale_vertex(input(), &block, 0).unwrap();
        let b = pulse_vertex(input(), &header, &[object], 0).unwrap();
        assert_eq!(a.clip, b.clip);
    }

    #[test]
    fn pulse_out_of_range_instance() {
        let header = PulseHeader::default();
        let objects = [OffsetScaleObject::default(); 4];
        assert!(pulse_vertex(input(), &header, &objects, 4).is_none());
    }

    // ── matrix ────────────────────────────────────────────────────────────

    #[test]
    fn matrix_identity_passes_position_through() {
        let object = MatrixObject::new(Mat4::IDENTITY, Vec3::new(0.1, 0.1, 0.1));
        let out = matrix_vertex(input(), &ViewProj::default(), &[object], 0).unwrap();
        assert_eq!(out.clip, Vec4::new(0.5, -0.25, 0.0, 1.0));
        assert!((out.color - Vec3::new(0.2, 0.3, 0.4)).abs().max_element() < EPS);
    }

    #[test]
    fn matrix_composes_proj_view_transform() {
        let transform = Mat4::from_scale(Vec3::splat(3.0));
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.01, 100.0);
        let pass = ViewProj::new(view, proj);

        let out = matrix_vertex(input(), &pass, &[MatrixObject::new(transform, Vec3::ZERO)], 0).unwrap();
        let expected = proj * view * transform * Vec4::new(0.5, -0.25, 0.0, 1.0);
        assert!((out.clip - expected).abs().max_element() < 1e-5);
    }

    #[test]
    fn matrix_out_of_range_instance() {
        assert!(matrix_vertex(input(), &ViewProj::default(), &[], 0).is_none());
    }
}
