use std::mem::size_of;

use anyhow::{Context, Result};

use crate::mesh::Mesh;
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::interface::PULSE_DATA;
use crate::shader::ShaderKind;
use crate::uniforms::{sized_block, OffsetScaleObject, PulseHeader};

use super::common::{
    begin_load_pass, create_pipeline, instance_count, uniform_buffer, uniform_entry,
    validate_mesh, MeshBuffers, PipelineDesc, RendererConfig,
};

/// Renderer for `pulse.vert` + `passthrough.frag`.
///
/// Same geometry as the offset/scale renderer; the color offset pulses with
/// `PulseHeader::time`. The object array is specialized to `object_capacity`.
pub struct PulseRenderer {
    mesh: Mesh,
    write_mask: wgpu::ColorWrites,
    capacity: u32,
    vs_source: String,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    data_ubo: Option<wgpu::Buffer>,

    mesh_buffers: Option<MeshBuffers>,

    warned_overflow: bool,
}

impl PulseRenderer {
    pub fn new(config: RendererConfig) -> Result<Self> {
        validate_mesh(&config.mesh)?;
        let vs_source = ShaderKind::Pulse
            .module_source(Some(config.object_capacity))
            .context("failed to specialize pulse.vert")?
            .into_owned();

        Ok(Self {
            mesh: config.mesh,
            write_mask: config.write_mask,
            capacity: config.object_capacity,
            vs_source,
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
        self.capacity
    }

    /// Bytes of the uniform block: header plus `capacity` objects.
    pub fn block_size(&self) -> u64 {
        (size_of::<PulseHeader>() + self.capacity as usize * size_of::<OffsetScaleObject>()) as u64
    }

    /// Replaces the drawn geometry. GPU buffers are rebuilt on the next render.
    pub fn set_mesh(&mut self, mesh: Mesh) -> Result<()> {
        validate_mesh(&mesh)?;
        self.mesh = mesh;
        self.mesh_buffers = None;
        Ok(())
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        header: &PulseHeader,
        objects: &[OffsetScaleObject],
    ) {
        let instances = instance_count(
            objects.len(),
            self.capacity,
            &mut self.warned_overflow,
            "pulse renderer",
        );
        if instances == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.mesh_buffers.is_none() {
            self.mesh_buffers = Some(MeshBuffers::upload(ctx.device, "aspen pulse mesh", &self.mesh));
        }

        let Some(data_ubo) = self.data_ubo.as_ref() else { return };
        let bytes = sized_block(Some(header), objects, self.capacity as usize);
        ctx.queue.write_buffer(data_ubo, 0, &bytes);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(mesh) = self.mesh_buffers.as_ref() else { return };

        let mut rpass = begin_load_pass(target, "aspen pulse pass", None);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(PULSE_DATA.set, bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
        rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..instances);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let vs = ShaderKind::Pulse.create_module(ctx.device, &self.vs_source);
        let fs = ShaderKind::Passthrough.create_module(ctx.device, ShaderKind::Passthrough.source());

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("aspen pulse bgl"),
                entries: &[uniform_entry(PULSE_DATA.binding, self.block_size())],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("aspen pulse pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = create_pipeline(
            ctx,
            PipelineDesc {
                label: "aspen pulse pipeline",
                layout: &pipeline_layout,
                vertex: &vs,
                fragment: &fs,
                write_mask: self.write_mask,
                depth_stencil: None,
            },
        );

        log::debug!(
            "pulse pipeline built for {:?} with {} objects",
            ctx.surface_format,
            self.capacity
        );

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

        let data_ubo = uniform_buffer(ctx.device, "aspen pulse ubo", self.block_size());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("aspen pulse bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: PULSE_DATA.binding,
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

    fn with_capacity(object_capacity: u32) -> Result<PulseRenderer> {
        PulseRenderer::new(RendererConfig {
            object_capacity,
            ..RendererConfig::default()
        })
    }

    #[test]
    fn source_is_specialized_to_capacity() {
        let r = with_capacity(4).unwrap();
        assert!(r.vs_source.contains("const uint NUM_OBJECTS = 4u;"));
        assert_eq!(r.block_size(), 32 + 4 * 32);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(with_capacity(0).is_err());
    }

    #[test]
    fn capacity_beyond_binding_limit_is_rejected() {
        assert!(with_capacity(ShaderKind::Pulse.max_objects()).is_ok());
        assert!(with_capacity(ShaderKind::Pulse.max_objects() + 1).is_err());
    }
}
