use std::borrow::Cow;
use std::fmt;

use wgpu::naga::ShaderStage;

use super::interface::{self, BindingSlot};
use super::{specialize, ShaderError, SpecConstant, SpecValue};

/// The four shader kernels shipped with the crate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    /// Interpolated color in, `vec4(color, 1.0)` out.
    Passthrough,
    /// Offset/scale instancing over a fixed 64-entry object array.
    OffsetScale,
    /// Per-object transform composed with view and projection.
    Matrix,
    /// Offset/scale instancing with a pulsing, time-driven color offset.
    Pulse,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 4] = [Self::Passthrough, Self::OffsetScale, Self::Matrix, Self::Pulse];

    pub fn stage(self) -> ShaderStage {
        match self {
            Self::Passthrough => ShaderStage::Fragment,
            Self::OffsetScale | Self::Matrix | Self::Pulse => ShaderStage::Vertex,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough.frag",
            Self::OffsetScale => "offset_scale.vert",
            Self::Matrix => "matrix.vert",
            Self::Pulse => "pulse.vert",
        }
    }

    /// Unmodified GLSL source.
    pub fn source(self) -> &'static str {
        match self {
            Self::Passthrough => include_str!("glsl/passthrough.frag"),
            Self::OffsetScale => include_str!("glsl/offset_scale.vert"),
            Self::Matrix => include_str!("glsl/matrix.vert"),
            Self::Pulse => include_str!("glsl/pulse.vert"),
        }
    }

    /// Uniform blocks read by this kernel.
    pub fn uniform_slots(self) -> &'static [BindingSlot] {
        match self {
            Self::Passthrough => &[],
            Self::OffsetScale => &[interface::OFFSET_SCALE_DATA],
            Self::Matrix => &[interface::MATRIX_PASS, interface::MATRIX_OBJECTS],
            Self::Pulse => &[interface::PULSE_DATA],
        }
    }

    /// Whether the object array is sized by `NUM_OBJECTS`.
    pub fn is_specializable(self) -> bool {
        matches!(self, Self::Matrix | Self::Pulse)
    }

    /// Byte stride of one `PerObject` entry (std140), if the kernel has an object array.
    pub fn object_stride(self) -> Option<u64> {
        match self {
            Self::Passthrough => None,
            Self::OffsetScale | Self::Pulse => Some(32),
            Self::Matrix => Some(80),
        }
    }

    /// Bytes of the block that precede the object array.
    fn object_block_header(self) -> u64 {
        match self {
            Self::OffsetScale | Self::Pulse => 32,
            Self::Passthrough | Self::Matrix => 0,
        }
    }

    /// Largest object count whose block fits in [`interface::MIN_UNIFORM_BINDING_SIZE`].
    pub fn max_objects(self) -> u32 {
        match self {
            Self::Passthrough => 0,
            Self::OffsetScale => interface::OFFSET_SCALE_OBJECTS,
            Self::Matrix | Self::Pulse => {
                let stride = self.object_stride().unwrap_or(1);
                ((interface::MIN_UNIFORM_BINDING_SIZE - self.object_block_header()) / stride) as u32
            }
        }
    }

    /// Checks `count` against the kernel's object capacity.
    pub fn validate_object_count(self, count: u32) -> Result<(), ShaderError> {
        if !self.is_specializable() {
            return Err(ShaderError::NotSpecializable { shader: self.file_name() });
        }
        let max = self.max_objects();
        if count == 0 || count > max {
            return Err(ShaderError::ObjectCount {
                shader: self.file_name(),
                count,
                max,
            });
        }
        Ok(())
    }

    /// Source finalized for a pipeline.
    ///
    /// `object_count` specializes `NUM_OBJECTS`; `None` keeps the declared default.
    /// Passing a count to a kernel without a sized array is an error.
    pub fn module_source(self, object_count: Option<u32>) -> Result<Cow<'static, str>, ShaderError> {
        let source = self.source();
        match object_count {
            None if !self.is_specializable() => Ok(Cow::Borrowed(source)),
            None => specialize(source, &[]).map(Cow::Owned),
            Some(count) => {
                self.validate_object_count(count)?;
                let constants = [SpecConstant::new(interface::NUM_OBJECTS_ID, SpecValue::Uint(count))];
                specialize(source, &constants).map(Cow::Owned)
            }
        }
    }

    /// Creates a wgpu shader module from already finalized source.
    pub fn create_module(self, device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
        log::debug!("compiling {} ({:?})", self.file_name(), self.stage());
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.file_name()),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(source.to_string()),
                stage: self.stage(),
                defines: &[],
            },
        })
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga;
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

    fn compile(kind: ShaderKind, object_count: Option<u32>) -> naga::Module {
        let src = kind.module_source(object_count).unwrap();
        let module = Frontend::default()
            .parse(&Options::from(kind.stage()), &src)
            .unwrap_or_else(|e| panic!("{kind} failed to parse: {e:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{kind} failed to validate: {e:?}"));
        module
    }

    fn uniform_slots(module: &naga::Module) -> Vec<BindingSlot> {
        let mut slots: Vec<BindingSlot> = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
            .filter_map(|(_, var)| var.binding.as_ref())
            .map(|b| BindingSlot::new(b.group, b.binding))
            .collect();
        slots.sort_by_key(|s| (s.set, s.binding));
        slots
    }

    fn input_locations(module: &naga::Module) -> Vec<u32> {
        let ep = &module.entry_points[0];
        let mut locs: Vec<u32> = ep
            .function
            .arguments
            .iter()
            .filter_map(|arg| match arg.binding {
                Some(naga::Binding::Location { location, .. }) => Some(location),
                _ => None,
            })
            .collect();
        locs.sort_unstable();
        locs
    }

    fn uniform_size(module: &naga::Module, slot: BindingSlot) -> u32 {
        let (_, var) = module
            .global_variables
            .iter()
            .find(|(_, var)| {
                var.binding
                    .as_ref()
                    .is_some_and(|b| b.group == slot.set && b.binding == slot.binding)
            })
            .expect("uniform slot present");
        module.types[var.ty].inner.size(module.to_ctx())
    }

    // ── compilation ───────────────────────────────────────────────────────

    #[test]
    fn every_kernel_compiles_with_defaults() {
        for kind in ShaderKind::ALL {
            compile(kind, None);
        }
    }

    #[test]
    fn specialized_kernels_compile() {
        compile(ShaderKind::Matrix, Some(4));
        compile(ShaderKind::Pulse, Some(ShaderKind::Pulse.max_objects()));
    }

    // ── binding contract ──────────────────────────────────────────────────

    #[test]
    fn reflected_uniform_slots_match_contract() {
        for kind in ShaderKind::ALL {
            let module = compile(kind, None);
            assert_eq!(uniform_slots(&module), kind.uniform_slots(), "{kind}");
        }
    }

    #[test]
    fn vertex_inputs_use_locations_zero_and_one() {
        for kind in [ShaderKind::OffsetScale, ShaderKind::Matrix, ShaderKind::Pulse] {
            let module = compile(kind, None);
            assert_eq!(
                input_locations(&module),
                vec![interface::POSITION_LOCATION, interface::COLOR_LOCATION],
                "{kind}"
            );
        }
    }

    #[test]
    fn fragment_reads_varying_color() {
        let module = compile(ShaderKind::Passthrough, None);
        assert_eq!(input_locations(&module), vec![interface::VARYING_COLOR_LOCATION]);
    }

    #[test]
    fn block_sizes_follow_object_count() {
        let module = compile(ShaderKind::OffsetScale, None);
        assert_eq!(uniform_size(&module, interface::OFFSET_SCALE_DATA), 32 + 64 * 32);

        let module = compile(ShaderKind::Pulse, Some(4));
        assert_eq!(uniform_size(&module, interface::PULSE_DATA), 32 + 4 * 32);

        let module = compile(ShaderKind::Matrix, Some(4));
        assert_eq!(uniform_size(&module, interface::MATRIX_PASS), 128);
        assert_eq!(uniform_size(&module, interface::MATRIX_OBJECTS), 4 * 80);
    }

    // ── specialization ────────────────────────────────────────────────────

    #[test]
    fn fixed_array_kernel_rejects_object_count() {
        assert_eq!(
            ShaderKind::OffsetScale.module_source(Some(4)).unwrap_err(),
            ShaderError::NotSpecializable { shader: "offset_scale.vert" }
        );
    }

    #[test]
    fn object_count_bounds() {
        assert!(ShaderKind::Matrix.module_source(Some(0)).is_err());
        assert!(ShaderKind::Matrix.module_source(Some(ShaderKind::Matrix.max_objects() + 1)).is_err());
        assert!(ShaderKind::Matrix.module_source(Some(1)).is_ok());
    }

    #[test]
    fn max_objects_fit_minimum_binding_size() {
        assert_eq!(ShaderKind::Matrix.max_objects(), 204);
        assert_eq!(ShaderKind::Pulse.max_objects(), 511);
        assert_eq!(ShaderKind::OffsetScale.max_objects(), 64);
    }

    #[test]
    fn unspecialized_fixed_kernel_is_borrowed() {
        assert!(matches!(ShaderKind::Passthrough.module_source(None).unwrap(), Cow::Borrowed(_)));
    }
}
