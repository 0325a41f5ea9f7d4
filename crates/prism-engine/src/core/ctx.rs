use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction, WgpuBackend};
use crate::render::{Camera, FrameRenderer, FrameStatus, Scene};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Drawable size in physical pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Width over height; 1.0 while the window is zero-sized.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.physical_size();
        if size.width == 0 || size.height == 0 {
            return 1.0;
        }
        size.width as f32 / size.height as f32
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut FrameRenderer<Gpu<'w>>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Renders `scene` as seen by `camera` and presents it.
    ///
    /// Returns `Exit` only on a fatal surface error; skipped frames continue.
    pub fn render<C, S>(&mut self, camera: &C, scene: &S) -> AppControl
    where
        C: Camera + ?Sized,
        S: Scene<WgpuBackend>,
    {
        self.window.window.pre_present_notify();

        match self.renderer.frame(camera, scene) {
            FrameStatus::SurfaceError(SurfaceErrorAction::Fatal) => {
                log::error!("fatal surface error; exiting");
                AppControl::Exit
            }
            FrameStatus::Skipped | FrameStatus::Presented | FrameStatus::SurfaceError(_) => {
                AppControl::Continue
            }
        }
    }
}
