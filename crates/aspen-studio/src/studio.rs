use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use aspen_engine::core::{App, AppControl, FrameCtx};
use aspen_engine::mesh::Mesh;
use aspen_engine::reference::{self, VertexInput};
use aspen_engine::render::{MatrixRenderer, OffsetScaleRenderer, PulseRenderer, RendererConfig};
use aspen_engine::uniforms::OffsetScaleBlock;

use crate::cli::Variant;
use crate::scene;

/// Studio application: one renderer per variant, one active at a time.
pub struct Studio {
    variant: Variant,
    objects: u32,
    title_stale: bool,

    offset_scale: OffsetScaleRenderer,
    matrix: MatrixRenderer,
    pulse: PulseRenderer,
}

impl Studio {
    pub fn new(variant: Variant, objects: u32) -> Result<Self> {
        let config = RendererConfig {
            mesh: Mesh::hexagon([0.0; 3]),
            object_capacity: objects,
            ..RendererConfig::default()
        };

        let studio = Self {
            variant,
            objects,
            title_stale: true,
            offset_scale: OffsetScaleRenderer::new(config.clone()).context("offset/scale renderer")?,
            matrix: MatrixRenderer::new(config.clone()).context("matrix renderer")?,
            pulse: PulseRenderer::new(config).context("pulse renderer")?,
        };
        studio.log_reference_sample();
        Ok(studio)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn select(&mut self, variant: Variant) {
        if variant == self.variant {
            return;
        }
        log::info!("switching to {variant} variant");
        self.variant = variant;
        self.title_stale = true;
        self.log_reference_sample();
    }

    fn handle_key(&mut self, event: &KeyEvent) -> AppControl {
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return AppControl::Continue;
        };
        let digit = match code {
            KeyCode::Escape => return AppControl::Exit,
            KeyCode::Digit1 | KeyCode::Numpad1 => 1,
            KeyCode::Digit2 | KeyCode::Numpad2 => 2,
            KeyCode::Digit3 | KeyCode::Numpad3 => 3,
            _ => return AppControl::Continue,
        };
        if let Some(v) = Variant::from_digit(digit) {
            self.select(v);
        }
        AppControl::Continue
    }

    /// Logs what the active vertex shader computes for the mesh centre of
    /// instance 0 at t = 0.
    fn log_reference_sample(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let viewport = aspen_engine::coords::Viewport::new(1.0, 1.0);
        let input = VertexInput::new(Vec2::ZERO, Vec3::ZERO);
        let out = match self.variant {
            Variant::OffsetScale => {
                let block = OffsetScaleBlock::new(
                    scene::offset_scale_header(viewport),
                    &scene::planar_objects(0.0, self.objects),
                );
                reference::offset_scale_vertex(input, &block, 0)
            }
            Variant::Pulse => reference::pulse_vertex(
                input,
                &scene::pulse_header(viewport, 0.0),
                &scene::planar_objects(0.0, self.objects),
                0,
            ),
            Variant::Matrix => reference::matrix_vertex(
                input,
                &scene::camera(viewport),
                &scene::world_objects(0.0, self.objects),
                0,
            ),
        };
        if let Some(out) = out {
            log::debug!("{} reference: clip {} color {}", self.variant, out.clip, out.color);
        }
    }
}

impl App for Studio {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event),
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.title_stale {
            ctx.window.set_title(&format!("aspen studio: {}", self.variant));
            self.title_stale = false;
        }

        let viewport = ctx.viewport();
        let elapsed = ctx.time.elapsed;
        let objects = self.objects;

        let Self {
            variant,
            offset_scale,
            matrix,
            pulse,
            ..
        } = self;

        ctx.render(scene::CLEAR, |rctx, target| match variant {
            Variant::OffsetScale => offset_scale.render(
                rctx,
                target,
                &scene::offset_scale_header(viewport),
                &scene::planar_objects(elapsed, objects),
            ),
            Variant::Matrix => matrix.render(
                rctx,
                target,
                &scene::camera(viewport),
                &scene::world_objects(elapsed, objects),
            ),
            Variant::Pulse => pulse.render(
                rctx,
                target,
                &scene::pulse_header(viewport, elapsed),
                &scene::planar_objects(elapsed, objects),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderers_share_object_count() {
        let studio = Studio::new(Variant::Matrix, 8).unwrap();
        assert_eq!(studio.variant(), Variant::Matrix);
        assert_eq!(studio.matrix.capacity(), 8);
        assert_eq!(studio.pulse.capacity(), 8);
        assert_eq!(studio.offset_scale.capacity(), 64);
    }

    #[test]
    fn select_marks_title_stale() {
        let mut studio = Studio::new(Variant::OffsetScale, 4).unwrap();
        studio.title_stale = false;
        studio.select(Variant::OffsetScale);
        assert!(!studio.title_stale);
        studio.select(Variant::Pulse);
        assert!(studio.title_stale);
        assert_eq!(studio.variant(), Variant::Pulse);
    }
}
