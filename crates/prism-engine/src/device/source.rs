use std::future::Future;

use anyhow::Result;
use winit::window::Window;

use crate::render::DeviceSource;

use super::{Gpu, GpuInit};

/// A window to present into, plus the parameters used to bring up its device.
///
/// Handed to [`FrameRenderer::init`](crate::render::FrameRenderer::init).
pub struct WindowSurface<'w> {
    window: &'w Window,
    init: GpuInit,
}

impl<'w> WindowSurface<'w> {
    pub fn new(window: &'w Window, init: GpuInit) -> Self {
        Self { window, init }
    }
}

impl<'w> DeviceSource for WindowSurface<'w> {
    type Device = Gpu<'w>;

    fn acquire(self) -> impl Future<Output = Result<Gpu<'w>>> {
        Gpu::new(self.window, self.init)
    }
}
