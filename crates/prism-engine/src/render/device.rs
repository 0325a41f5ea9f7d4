use std::future::Future;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::device::SurfaceErrorAction;

use super::RenderPassConfig;

/// Resource types a device hands out to the renderer and to drawables.
pub trait Backend: 'static {
    /// Device-resident buffer.
    type Buffer;

    /// View of the depth/stencil texture.
    type DepthView;

    /// Active render-pass recorder passed to [`Drawable::draw`](super::Drawable::draw).
    type Pass<'p>;

    /// Device handle passed to [`Drawable::draw`](super::Drawable::draw).
    type Handle;
}

pub type BufferOf<D> = <<D as RenderDevice>::Backend as Backend>::Buffer;
pub type DepthViewOf<D> = <<D as RenderDevice>::Backend as Backend>::DepthView;

/// Operations the frame renderer issues against a device.
///
/// Implemented by `device::Gpu` for wgpu.
pub trait RenderDevice: Sized {
    type Backend: Backend;

    /// An acquired swapchain image plus the command recording targeting it.
    type Frame;

    fn handle(&self) -> &<Self::Backend as Backend>::Handle;

    /// Current surface size in physical pixels.
    fn size(&self) -> PhysicalSize<u32>;

    /// Reconfigures the presentation surface.
    fn resize(&mut self, new_size: PhysicalSize<u32>);

    /// Allocates a `UNIFORM | COPY_DST` buffer of exactly `size` bytes.
    fn create_uniform_buffer(&self, label: &str, size: u64) -> BufferOf<Self>;

    /// Overwrites `buffer` from offset 0 with `data`.
    fn write_buffer(&self, buffer: &BufferOf<Self>, data: &[u8]);

    /// Creates a fresh depth/stencil texture and returns its view.
    fn create_depth_view(&self, size: PhysicalSize<u32>) -> DepthViewOf<Self>;

    fn begin_frame(&self) -> std::result::Result<Self::Frame, wgpu::SurfaceError>;

    /// Begins the pass described by `config` on `frame`, with the frame's image as
    /// color target, hands it to `record`, then ends it.
    fn record_pass<F>(
        &self,
        frame: &mut Self::Frame,
        config: &RenderPassConfig<DepthViewOf<Self>>,
        record: F,
    ) where
        F: FnOnce(&mut <Self::Backend as Backend>::Pass<'_>);

    /// Submits the recorded commands and presents the frame's image.
    fn submit(&self, frame: Self::Frame);

    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction;
}

/// Something a [`RenderDevice`] can be brought up from (typically a window).
///
/// Acquisition is asynchronous; blocking callers drive it with `pollster::block_on`.
pub trait DeviceSource {
    type Device: RenderDevice;

    fn acquire(self) -> impl Future<Output = Result<Self::Device>>;
}
