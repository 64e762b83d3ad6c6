//! Animated object sets for each variant.
//!
//! Four base objects orbit on sine paths a quarter period apart; larger
//! counts repeat the four paths with a continuing phase.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec2, Vec3};

use aspen_engine::coords::Viewport;
use aspen_engine::uniforms::{MatrixObject, OffsetScaleHeader, OffsetScaleObject, PulseHeader, ViewProj};

const COLOR_OFFSETS: [[f32; 3]; 4] = [
    [0.3, 1.0, 0.5],
    [1.0, 0.2, 0.5],
    [0.3, 0.5, 1.0],
    [1.0, 0.5, 0.2],
];

const PHASE_STEP: f32 = 0.25 * 3.141;

const OBJECT_SCALE: f32 = 0.45;
const VIEWPORT_SCALE: f32 = 0.5;

/// Amplitude of the clip-space paths.
const PLANAR_RADIUS: f32 = 1.5;
/// Amplitude of the world-space paths.
const WORLD_RADIUS: f32 = 5.0;
const WORLD_SCALE: f32 = 3.0;
const WORLD_DEPTH_STEP: f32 = 3.0;

pub const CLEAR: wgpu::Color = wgpu::Color { r: 0.07, g: 0.07, b: 0.07, a: 1.0 };

/// Direction of object `i` at time `t`: (-s, 0), (0, s), (s, s), (s, -s).
fn path(i: u32, t: f32) -> Vec2 {
    let s = (t + i as f32 * PHASE_STEP).sin();
    match i % 4 {
        0 => Vec2::new(-s, 0.0),
        1 => Vec2::new(0.0, s),
        2 => Vec2::new(s, s),
        _ => Vec2::new(s, -s),
    }
}

fn color_offset(i: u32) -> Vec3 {
    Vec3::from(COLOR_OFFSETS[i as usize % COLOR_OFFSETS.len()])
}

/// Objects for the offset/scale and pulse variants. Paths run at twice wall speed.
pub fn planar_objects(elapsed: f32, count: u32) -> Vec<OffsetScaleObject> {
    let t = elapsed * 2.0;
    (0..count)
        .map(|i| {
            OffsetScaleObject::new(
                path(i, t) * PLANAR_RADIUS,
                Vec2::splat(OBJECT_SCALE),
                color_offset(i),
            )
        })
        .collect()
}

pub fn offset_scale_header(viewport: Viewport) -> OffsetScaleHeader {
    OffsetScaleHeader::new(viewport.x_correction(), VIEWPORT_SCALE, Vec2::ZERO)
}

pub fn pulse_header(viewport: Viewport, elapsed: f32) -> PulseHeader {
    PulseHeader::new(viewport.x_correction(), VIEWPORT_SCALE, Vec2::ZERO, elapsed)
}

/// Camera for the matrix variant: looking at the origin from just off the z axis.
pub fn camera(viewport: Viewport) -> ViewProj {
    let view = Mat4::look_at_rh(Vec3::new(1.5, 0.0, -9.0), Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(FRAC_PI_2, viewport.aspect(), 0.01, 100.0);
    ViewProj::new(view, proj)
}

/// Objects for the matrix variant: scaled, spinning about -Z, spread in depth.
/// Paths and spin run at twice wall speed.
pub fn world_objects(elapsed: f32, count: u32) -> Vec<MatrixObject> {
    let t = elapsed * 2.0;
    let spin = Mat4::from_axis_angle(Vec3::NEG_Z, t % TAU);
    (0..count)
        .map(|i| {
            let along = path(i, t) * WORLD_RADIUS;
            let translation = along.extend(i as f32 * WORLD_DEPTH_STEP);
            let transform = Mat4::from_translation(translation) * Mat4::from_scale(Vec3::splat(WORLD_SCALE)) * spin;
            MatrixObject::new(transform, color_offset(i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use aspen_engine::reference::{matrix_vertex, VertexInput};

    // ── planar ────────────────────────────────────────────────────────────

    #[test]
    fn planar_objects_at_rest() {
        let objs = planar_objects(0.0, 4);
        assert_eq!(objs.len(), 4);
        assert_eq!(objs[0].offset, [0.0, 0.0]);
        assert_eq!(objs[0].scale, [OBJECT_SCALE; 2]);
        assert_eq!(objs[3].color_offset, [1.0, 0.5, 0.2]);
    }

    #[test]
    fn diagonal_paths_move_together() {
        let objs = planar_objects(0.3, 4);
        assert_eq!(objs[2].offset[0], objs[2].offset[1]);
        assert_eq!(objs[3].offset[0], -objs[3].offset[1]);
        assert_eq!(objs[1].offset[0], 0.0);
    }

    #[test]
    fn extra_objects_repeat_colors() {
        let objs = planar_objects(1.0, 9);
        assert_eq!(objs.len(), 9);
        assert_eq!(objs[8].color_offset, objs[0].color_offset);
    }

    #[test]
    fn headers_use_height_over_width() {
        let v = Viewport::new(800.0, 400.0);
        assert_eq!(offset_scale_header(v).aspect_ratio, 0.5);
        let p = pulse_header(v, 3.0);
        assert_eq!(p.time, 3.0);
        assert_eq!(p.viewport_scale, VIEWPORT_SCALE);
    }

    // ── world ─────────────────────────────────────────────────────────────

    #[test]
    fn world_objects_spread_in_depth() {
        let objs = world_objects(0.0, 4);
        let z: Vec<f32> = objs.iter().map(|o| o.transform[3][2]).collect();
        assert_eq!(z, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn world_paths_run_at_double_speed() {
        let objs = world_objects(0.5, 2);
        let expected = (1.0 + PHASE_STEP).sin() * WORLD_RADIUS;
        assert!((objs[1].transform[3][1] - expected).abs() < 1e-5);
        assert_eq!(objs[1].transform[3][0], 0.0);
    }

    #[test]
    fn later_instances_sit_deeper() {
        let pass = camera(Viewport::new(1024.0, 768.0));
        let centre = VertexInput::new(Vec2::ZERO, Vec3::ZERO);
        for step in 0..20 {
            let elapsed = step as f32 * 0.4;
            let objs = world_objects(elapsed, 4);
            let depths: Vec<f32> = (0..4)
                .map(|i| {
                    let out = matrix_vertex(centre, &pass, &objs, i).unwrap();
                    out.clip.z / out.clip.w
                })
                .collect();
            assert!(
                depths.windows(2).all(|w| w[0] < w[1]),
                "t={elapsed}: depths {depths:?} must grow with draw order"
            );
        }
    }

    #[test]
    fn first_object_centre_is_in_view() {
        let pass = camera(Viewport::new(1024.0, 768.0));
        let objs = world_objects(0.0, 1);
        let out = matrix_vertex(VertexInput::new(Vec2::ZERO, Vec3::ZERO), &pass, &objs, 0).unwrap();
        let ndc = out.clip / out.clip.w;
        assert!(out.clip.w > 0.0);
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    }
}
