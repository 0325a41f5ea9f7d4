use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// Picks the swapchain format: `preferred` when supported, else the surface's first format.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    preferred: wgpu::TextureFormat,
) -> Option<wgpu::TextureFormat> {
    if formats.contains(&preferred) {
        return Some(preferred);
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Returns `true` when a surface of this size can be configured.
///
/// wgpu rejects 0x0 configurations (e.g. a minimized window).
#[inline]
pub(crate) fn is_presentable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if !is_presentable(new_size) {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

/// Maps an acquisition error onto the action the frame loop should take.
pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    let action = classify_surface_error(&err);
    if action == SurfaceErrorAction::Reconfigured && is_presentable(size) {
        surface.configure(device, config);
    }

    log::warn!("surface error: {err} -> {action:?}");
    action
}
