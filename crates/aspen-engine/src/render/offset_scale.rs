use std::mem::size_of;

use anyhow::Result;

use crate::mesh::Mesh;
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::interface::{OFFSET_SCALE_DATA, OFFSET_SCALE_OBJECTS};
use crate::shader::ShaderKind;
use crate::uniforms::{OffsetScaleBlock, OffsetScaleHeader, OffsetScaleObject};

use super::common::{
    begin_load_pass, create_pipeline, instance_count, uniform_buffer, uniform_entry,
    validate_mesh, MeshBuffers, PipelineDesc, RendererConfig,
};

const BLOCK_SIZE: u64 = size_of::<OffsetScaleBlock>() as u64;

/// Renderer for `offset_scale.vert` + `passthrough.frag`.
///
/// Draws the mesh once per object (at most 64). The whole block, header and
/// object array, lives in one uniform buffer at set 0 binding 0.
pub struct OffsetScaleRenderer {
    mesh: Mesh,
    write_mask: wgpu::ColorWrites,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    data_ubo: Option<wgpu::Buffer>,

    mesh_buffers: Option<MeshBuffers>,

    warned_overflow: bool,
}

impl OffsetScaleRenderer {
    pub fn new(config: RendererConfig) -> Result<Self> {
        validate_mesh(&config.mesh)?;
        if config.object_capacity != OFFSET_SCALE_OBJECTS {
            log::debug!(
                "offset/scale renderer has a fixed array of {OFFSET_SCALE_OBJECTS}; requested capacity {} ignored",
                config.object_capacity
            );
        }
        Ok(Self {
            mesh: config.mesh,
            write_mask: config.write_mask,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            data_ubo: None,
            mesh_buffers: None,
            warned_overflow: false,
        })
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        OFFSET_SCALE_OBJECTS
    }

    /// Replaces the drawn geometry. GPU buffers are rebuilt on the next render.
    pub fn set_mesh(&mut self, mesh: Mesh) -> Result<()> {
        validate_mesh(&mesh)?;
        self.mesh = mesh;
        self.mesh_buffers = None;
        Ok(())
    }

    /// Draws one instance per entry of `objects` into `target`.
    ///
    /// An empty slice records nothing; objects past the array length are dropped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        header: &OffsetScaleHeader,
        objects: &[OffsetScaleObject],
    ) {
        let instances = instance_count(
            objects.len(),
            OFFSET_SCALE_OBJECTS,
            &mut self.warned_overflow,
            "offset/scale renderer",
        );
        if instances == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.mesh_buffers.is_none() {
            self.mesh_buffers = Some(MeshBuffers::upload(ctx.device, "aspen offset/scale mesh", &self.mesh));
        }

        let Some(data_ubo) = self.data_ubo.as_ref() else { return };
        let block = OffsetScaleBlock::new(*header, objects);
        ctx.queue.write_buffer(data_ubo, 0, bytemuck::bytes_of(&block));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(mesh) = self.mesh_buffers.as_ref() else { return };

        let mut rpass = begin_load_pass(target, "aspen offset/scale pass", None);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(OFFSET_SCALE_DATA.set, bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
        rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..instances);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let vs = ShaderKind::OffsetScale.create_module(ctx.device, ShaderKind::OffsetScale.source());
        let fs = ShaderKind::Passthrough.create_module(ctx.device, ShaderKind::Passthrough.source());

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("aspen offset/scale bgl"),
                entries: &[uniform_entry(OFFSET_SCALE_DATA.binding, BLOCK_SIZE)],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("aspen offset/scale pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = create_pipeline(
            ctx,
            PipelineDesc {
                label: "aspen offset/scale pipeline",
                layout: &pipeline_layout,
                vertex: &vs,
                fragment: &fs,
                write_mask: self.write_mask,
                depth_stencil: None,
            },
        );

        log::debug!("offset/scale pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.data_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.data_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let data_ubo = uniform_buffer(ctx.device, "aspen offset/scale ubo", BLOCK_SIZE);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aspen offset/scale bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: OFFSET_SCALE_DATA.binding,
                resource: data_ubo.as_entire_binding(),
            }],
        });

        self.data_ubo = Some(data_ubo);
        self.bind_group = Some(bind_group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_size_matches_shader() {
        assert_eq!(BLOCK_SIZE, 2080);
    }

    #[test]
    fn capacity_is_fixed() {
        let cfg = RendererConfig {
            object_capacity: 4,
            ..RendererConfig::default()
        };
        let r = OffsetScaleRenderer::new(cfg).unwrap();
        assert_eq!(r.capacity(), 64);
    }

    #[test]
    fn set_mesh_rejects_invalid_geometry() {
        let mut r = OffsetScaleRenderer::new(RendererConfig::default()).unwrap();
        let bad = Mesh { vertices: Vec::new(), indices: vec![0] };
        assert!(r.set_mesh(bad).is_err());
        assert!(r.set_mesh(Mesh::quad(0.5, [0.0; 3])).is_ok());
    }
}
