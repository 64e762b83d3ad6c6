//! Shared GPU plumbing used by all instanced renderers.

use std::num::NonZeroU64;

use anyhow::{ensure, Result};
use wgpu::util::DeviceExt;

use crate::mesh::{Mesh, PosColVertex};
use crate::shader::interface::DEFAULT_NUM_OBJECTS;

use super::{RenderCtx, RenderTarget};

// ── config ────────────────────────────────────────────────────────────────

/// Construction parameters shared by the renderers.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Geometry drawn once per object.
    pub mesh: Mesh,

    /// Length of the object array the pipeline is specialized for.
    ///
    /// Ignored by the fixed-array offset/scale renderer.
    pub object_capacity: u32,

    /// Channels the pipeline writes to the color target.
    pub write_mask: wgpu::ColorWrites,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            mesh: Mesh::hexagon([0.0; 3]),
            object_capacity: DEFAULT_NUM_OBJECTS,
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

pub(super) fn validate_mesh(mesh: &Mesh) -> Result<()> {
    ensure!(
        mesh.is_valid(),
        "mesh must hold whole triangles with in-range indices ({} vertices, {} indices)",
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(())
}

// ── uniform bindings ──────────────────────────────────────────────────────

/// Vertex-stage uniform buffer entry with an exact minimum binding size.
pub(super) fn uniform_entry(binding: u32, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

pub(super) fn uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// ── mesh buffers ──────────────────────────────────────────────────────────

pub(super) struct MeshBuffers {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(format!("{label} vbo").as_str()),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(format!("{label} ibo").as_str()),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vbo,
            ibo,
            index_count: mesh.index_count(),
        }
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

pub(super) struct PipelineDesc<'a> {
    pub label: &'a str,
    pub layout: &'a wgpu::PipelineLayout,
    pub vertex: &'a wgpu::ShaderModule,
    pub fragment: &'a wgpu::ShaderModule,
    pub write_mask: wgpu::ColorWrites,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
}

/// Opaque triangle-list pipeline over [`PosColVertex`] with both faces drawn.
pub(super) fn create_pipeline(ctx: &RenderCtx<'_>, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),

        vertex: wgpu::VertexState {
            module: desc.vertex,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            buffers: &[PosColVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: desc.fragment,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: desc.write_mask,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: desc.depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Opens a pass that keeps the target's existing color contents.
///
/// `depth`, when given, is cleared to 1.0 at the start of the pass.
pub(super) fn begin_load_pass<'e>(
    target: &'e mut RenderTarget<'_>,
    label: &str,
    depth: Option<&wgpu::TextureView>,
) -> wgpu::RenderPass<'e> {
    target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

// ── depth ─────────────────────────────────────────────────────────────────

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth attachment sized to the render target. Recreated when the target
/// size changes.
pub(super) struct DepthTarget {
    pub size: [u32; 2],
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, label: &str, size: [u32; 2]) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0].max(1),
                height: size[1].max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { size, view }
    }
}

// ── instance bound ────────────────────────────────────────────────────────

/// Number of instances to draw for `objects`, never past `capacity`.
///
/// Overflow is reported once per renderer through `warned`.
pub(super) fn instance_count(objects: usize, capacity: u32, warned: &mut bool, label: &str) -> u32 {
    let capacity = capacity as usize;
    if objects > capacity && !*warned {
        log::warn!("{label}: {objects} objects exceed the array length {capacity}; extra objects are not drawn");
        *warned = true;
    }
    objects.min(capacity) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_count_within_capacity() {
        let mut warned = false;
        assert_eq!(instance_count(4, 64, &mut warned, "test"), 4);
        assert!(!warned);
    }

    #[test]
    fn instance_count_clamps_and_warns_once() {
        let mut warned = false;
        assert_eq!(instance_count(100, 64, &mut warned, "test"), 64);
        assert!(warned);
        assert_eq!(instance_count(65, 64, &mut warned, "test"), 64);
    }

    #[test]
    fn uniform_entry_is_vertex_only() {
        let e = uniform_entry(0, 128);
        assert_eq!(e.visibility, wgpu::ShaderStages::VERTEX);
        assert!(matches!(
            e.ty,
            wgpu::BindingType::Buffer { min_binding_size: Some(s), .. } if s.get() == 128
        ));
    }

    #[test]
    fn depth_format_is_depth_only() {
        assert!(DEPTH_FORMAT.has_depth_aspect());
        assert!(!DEPTH_FORMAT.has_stencil_aspect());
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = RendererConfig::default();
        assert!(validate_mesh(&cfg.mesh).is_ok());
        assert_eq!(cfg.object_capacity, 64);
    }

    #[test]
    fn invalid_mesh_is_rejected() {
        let mesh = Mesh { vertices: Vec::new(), indices: vec![0, 1, 2] };
        assert!(validate_mesh(&mesh).is_err());
    }
}
