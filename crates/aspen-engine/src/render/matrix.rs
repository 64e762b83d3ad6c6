use std::mem::size_of;

use anyhow::{Context, Result};

use crate::mesh::Mesh;
use crate::render::{RenderCtx, RenderTarget};
use crate::shader::interface::{MATRIX_OBJECTS, MATRIX_PASS, MATRIX_SET_COUNT};
use crate::shader::ShaderKind;
use crate::uniforms::{sized_block, MatrixObject, ViewProj};

use super::common::{
    begin_load_pass, create_pipeline, instance_count, uniform_buffer, uniform_entry,
    validate_mesh, DepthTarget, MeshBuffers, PipelineDesc, RendererConfig, DEPTH_FORMAT,
};

const PASS_SIZE: u64 = size_of::<ViewProj>() as u64;

/// Nearer fragments win; the depth target is cleared every pass.
fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Bind group layouts and groups, indexed by set.
///
/// Sets the shader does not use get an empty layout and an empty group; wgpu
/// requires every group of the pipeline layout to be bound.
struct SetBindings {
    layouts: Vec<wgpu::BindGroupLayout>,
    groups: Vec<wgpu::BindGroup>,
    pass_ubo: wgpu::Buffer,
    objects_ubo: wgpu::Buffer,
}

/// Renderer for `matrix.vert` + `passthrough.frag`.
///
/// View/projection live at set 1, per-object transforms at set 3. The object
/// array is specialized to `object_capacity`. Instances are depth tested
/// against a private `Depth32Float` target sized to the render target.
pub struct MatrixRenderer {
    mesh: Mesh,
    write_mask: wgpu::ColorWrites,
    capacity: u32,
    vs_source: String,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bindings: Option<SetBindings>,

    mesh_buffers: Option<MeshBuffers>,
    depth: Option<DepthTarget>,

    warned_overflow: bool,
}

impl MatrixRenderer {
    pub fn new(config: RendererConfig) -> Result<Self> {
        validate_mesh(&config.mesh)?;
        let vs_source = ShaderKind::Matrix
            .module_source(Some(config.object_capacity))
            .context("failed to specialize matrix.vert")?
            .into_owned();

        Ok(Self {
            mesh: config.mesh,
            write_mask: config.write_mask,
            capacity: config.object_capacity,
            vs_source,
            pipeline_format: None,
            pipeline: None,
            bindings: None,
            mesh_buffers: None,
            depth: None,
            warned_overflow: false,
        })
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes of the per-object block.
    pub fn objects_size(&self) -> u64 {
        (self.capacity as usize * size_of::<MatrixObject>()) as u64
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
        pass: &ViewProj,
        objects: &[MatrixObject],
    ) {
        let instances = instance_count(
            objects.len(),
            self.capacity,
            &mut self.warned_overflow,
            "matrix renderer",
        );
        if instances == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        if self.mesh_buffers.is_none() {
            self.mesh_buffers = Some(MeshBuffers::upload(ctx.device, "aspen matrix mesh", &self.mesh));
        }
        if self.depth.as_ref().is_none_or(|d| d.size != target.size) {
            self.depth = Some(DepthTarget::new(ctx.device, "aspen matrix depth", target.size));
        }

        let Some(bindings) = self.bindings.as_ref() else { return };
        ctx.queue.write_buffer(&bindings.pass_ubo, 0, bytemuck::bytes_of(pass));
        let bytes = sized_block::<ViewProj, _>(None, objects, self.capacity as usize);
        ctx.queue.write_buffer(&bindings.objects_ubo, 0, &bytes);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(mesh) = self.mesh_buffers.as_ref() else { return };
        let Some(depth) = self.depth.as_ref() else { return };

        let mut rpass = begin_load_pass(target, "aspen matrix pass", Some(&depth.view));
        rpass.set_pipeline(pipeline);
        for (set, group) in bindings.groups.iter().enumerate() {
            rpass.set_bind_group(set as u32, group, &[]);
        }
        rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
        rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..instances);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let vs = ShaderKind::Matrix.create_module(ctx.device, &self.vs_source);
        let fs = ShaderKind::Passthrough.create_module(ctx.device, ShaderKind::Passthrough.source());

        let bindings = self.create_bindings(ctx);
        let layout_refs: Vec<&wgpu::BindGroupLayout> = bindings.layouts.iter().collect();

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("aspen matrix pipeline layout"),
                bind_group_layouts: &layout_refs,
                immediate_size: 0,
            });

        let pipeline = create_pipeline(
            ctx,
            PipelineDesc {
                label: "aspen matrix pipeline",
                layout: &pipeline_layout,
                vertex: &vs,
                fragment: &fs,
                write_mask: self.write_mask,
                depth_stencil: Some(depth_state()),
            },
        );

        log::debug!(
            "matrix pipeline built for {:?} with {} objects",
            ctx.surface_format,
            self.capacity
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bindings = Some(bindings);
        self.depth = None;
    }

    fn create_bindings(&self, ctx: &RenderCtx<'_>) -> SetBindings {
        let pass_ubo = uniform_buffer(ctx.device, "aspen matrix pass ubo", PASS_SIZE);
        let objects_ubo = uniform_buffer(ctx.device, "aspen matrix objects ubo", self.objects_size());

        let mut layouts = Vec::with_capacity(MATRIX_SET_COUNT as usize);
        let mut groups = Vec::with_capacity(MATRIX_SET_COUNT as usize);

        for set in 0..MATRIX_SET_COUNT {
            let (entry, buffer) = if set == MATRIX_PASS.set {
                (Some(uniform_entry(MATRIX_PASS.binding, PASS_SIZE)), Some((MATRIX_PASS.binding, &pass_ubo)))
            } else if set == MATRIX_OBJECTS.set {
                (
                    Some(uniform_entry(MATRIX_OBJECTS.binding, self.objects_size())),
                    Some((MATRIX_OBJECTS.binding, &objects_ubo)),
                )
            } else {
                (None, None)
            };

            let label = format!("aspen matrix set {set}");
            let layout = ctx
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(label.as_str()),
                    entries: entry.as_slice(),
                });

            let entries: Vec<wgpu::BindGroupEntry<'_>> = buffer
                .into_iter()
                .map(|(binding, ubo)| wgpu::BindGroupEntry {
                    binding,
                    resource: ubo.as_entire_binding(),
                })
                .collect();

            let group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label.as_str()),
                layout: &layout,
                entries: &entries,
            });

            layouts.push(layout);
            groups.push(group);
        }

        SetBindings {
            layouts,
            groups,
            pass_ubo,
            objects_ubo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_capacity(object_capacity: u32) -> Result<MatrixRenderer> {
        MatrixRenderer::new(RendererConfig {
            object_capacity,
            ..RendererConfig::default()
        })
    }

    #[test]
    fn source_is_specialized_to_capacity() {
        let r = with_capacity(4).unwrap();
        assert!(r.vs_source.contains("const uint NUM_OBJECTS = 4u;"));
        assert_eq!(r.objects_size(), 320);
    }

    #[test]
    fn capacity_limits() {
        assert!(with_capacity(0).is_err());
        assert!(with_capacity(204).is_ok());
        assert!(with_capacity(205).is_err());
    }

    #[test]
    fn depth_test_keeps_nearer_fragments() {
        let depth = depth_state();
        assert_eq!(depth.format, wgpu::TextureFormat::Depth32Float);
        assert_eq!(depth.depth_compare, wgpu::CompareFunction::Less);
        assert!(depth.depth_write_enabled);
        assert!(!depth.stencil.is_enabled());
    }

    #[test]
    fn pipeline_layout_spans_four_sets() {
        assert_eq!(MATRIX_SET_COUNT, 4);
        assert_eq!(PASS_SIZE, 128);
    }
}
