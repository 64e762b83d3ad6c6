use anyhow::{ensure, Result};

use crate::shader::interface::{MATRIX_SET_COUNT, MIN_UNIFORM_BINDING_SIZE};

use super::SurfaceErrorAction;

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        if let Some(f) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(f);
        }
    }
    caps.formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Fails when the device cannot host every shader pipeline.
pub(crate) fn check_limits(limits: &wgpu::Limits) -> Result<()> {
    ensure!(
        limits.max_bind_groups >= MATRIX_SET_COUNT,
        "device supports {} bind groups; the matrix pipeline needs {MATRIX_SET_COUNT}",
        limits.max_bind_groups
    );
    ensure!(
        u64::from(limits.max_uniform_buffer_binding_size) >= MIN_UNIFORM_BINDING_SIZE,
        "device uniform bindings are limited to {} bytes; {MIN_UNIFORM_BINDING_SIZE} required",
        limits.max_uniform_buffer_binding_size
    );
    Ok(())
}

/// Maps a surface error to the runtime's response.
///
/// `Reconfigured` means the caller must configure the surface again (skipped
/// while the window has no area).
pub(crate) fn surface_error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    #[test]
    fn srgb_format_preferred() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb]);
        assert_eq!(choose_surface_format(&c, true), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&c, false), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn no_formats_yields_none() {
        assert_eq!(choose_surface_format(&caps(Vec::new()), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(vec![wgpu::TextureFormat::Rgba8Unorm]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn downlevel_limits_are_enough() {
        assert!(check_limits(&wgpu::Limits::downlevel_defaults()).is_ok());
    }

    #[test]
    fn too_few_bind_groups_is_rejected() {
        let limits = wgpu::Limits {
            max_bind_groups: 2,
            ..wgpu::Limits::downlevel_defaults()
        };
        assert!(check_limits(&limits).is_err());
    }

    #[test]
    fn lost_surface_is_reconfigured() {
        assert_eq!(surface_error_action(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(surface_error_action(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(surface_error_action(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
