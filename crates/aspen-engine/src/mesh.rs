//! Indexed position/color meshes fed to the vertex shaders.

use std::f32::consts::TAU;

use anyhow::{ensure, Result};
use bytemuck::{Pod, Zeroable};

use crate::shader::interface::{COLOR_LOCATION, POSITION_LOCATION};

const HEXAGON_SIDES: u32 = 6;
const HEXAGON_RADIUS: f32 = 0.5;

/// Interleaved vertex matching `position` (location 0) and `color` (location 1).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PosColVertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

impl PosColVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        POSITION_LOCATION => Float32x2,
        COLOR_LOCATION => Float32x3
    ];

    #[inline]
    pub const fn new(position: [f32; 2], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PosColVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Triangle-list mesh with 32-bit indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<PosColVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Regular polygon centred on the origin, first corner pointing to -Y.
    ///
    /// Built as a fan around a centre vertex; every vertex takes `color`.
    pub fn regular_polygon(sides: u32, radius: f32, color: [f32; 3]) -> Result<Self> {
        ensure!(sides >= 3, "a polygon needs at least 3 sides, got {sides}");
        ensure!(radius.is_finite() && radius > 0.0, "invalid polygon radius {radius}");
        Ok(Self::fan(sides, radius, color))
    }

    /// The hexagon used by the studio scene (radius 0.5).
    pub fn hexagon(color: [f32; 3]) -> Self {
        Self::fan(HEXAGON_SIDES, HEXAGON_RADIUS, color)
    }

    /// Requires `sides >= 3` and a finite, positive `radius`.
    fn fan(sides: u32, radius: f32, color: [f32; 3]) -> Self {
        let mut vertices = Vec::with_capacity(sides as usize + 1);
        vertices.push(PosColVertex::new([0.0, 0.0], color));
        let step = TAU / sides as f32;
        for i in 0..sides {
            let angle = step * i as f32 - TAU / 4.0;
            vertices.push(PosColVertex::new(
                [radius * angle.cos(), radius * angle.sin()],
                color,
            ));
        }

        let mut indices = Vec::with_capacity(sides as usize * 3);
        for i in 1..sides {
            indices.extend_from_slice(&[i, 0, i + 1]);
        }
        indices.extend_from_slice(&[sides, 0, 1]);

        Self { vertices, indices }
    }

    /// Axis-aligned square spanning `-half..half`.
    pub fn quad(half: f32, color: [f32; 3]) -> Self {
        Self {
            vertices: vec![
                PosColVertex::new([-half, -half], color),
                PosColVertex::new([half, -half], color),
                PosColVertex::new([half, half], color),
                PosColVertex::new([-half, half], color),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Non-empty, whole triangles, every index in range.
    pub fn is_valid(&self) -> bool {
        !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < self.vertices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_is_twenty_bytes() {
        assert_eq!(PosColVertex::layout().array_stride, 20);
        assert_eq!(PosColVertex::ATTRS[1].offset, 8);
        assert_eq!(PosColVertex::ATTRS[1].shader_location, COLOR_LOCATION);
    }

    #[test]
    fn hexagon_is_a_closed_fan() {
        let mesh = Mesh::hexagon([0.0; 3]);
        assert_eq!(mesh.vertices.len(), 7);
        assert_eq!(mesh.index_count(), 18);
        assert_eq!(&mesh.indices[15..], &[6, 0, 1]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn polygon_first_corner_points_down_negative_y() {
        let mesh = Mesh::regular_polygon(4, 2.0, [0.0; 3]).unwrap();
        let [x, y] = mesh.vertices[1].position;
        assert!(x.abs() < 1e-6);
        assert!((y + 2.0).abs() < 1e-6);
    }

    #[test]
    fn polygon_rejects_degenerate_input() {
        assert!(Mesh::regular_polygon(2, 1.0, [0.0; 3]).is_err());
        assert!(Mesh::regular_polygon(5, 0.0, [0.0; 3]).is_err());
        assert!(Mesh::regular_polygon(5, f32::NAN, [0.0; 3]).is_err());
    }

    #[test]
    fn hexagon_matches_checked_builder() {
        let color = [0.1, 0.2, 0.3];
        let checked = Mesh::regular_polygon(HEXAGON_SIDES, HEXAGON_RADIUS, color).unwrap();
        assert_eq!(Mesh::hexagon(color), checked);
    }

    #[test]
    fn quad_is_valid() {
        assert!(Mesh::quad(0.5, [1.0; 3]).is_valid());
    }

    #[test]
    fn out_of_range_index_is_invalid() {
        let mut mesh = Mesh::quad(0.5, [1.0; 3]);
        mesh.indices[5] = 4;
        assert!(!mesh.is_valid());
    }
}
