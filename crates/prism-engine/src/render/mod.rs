//! Frame rendering.
//!
//! [`FrameRenderer`] owns the device, the two per-frame uniform buffers and the
//! render-pass configuration. Each frame it uploads the camera and light data,
//! then records one pass in which every scene object draws itself.
//!
//! The renderer talks to the GPU only through [`RenderDevice`], so the same code
//! drives wgpu (`device::Gpu`) and the recording device used in tests.

mod device;
mod pass;
mod renderer;
mod scene;

pub use device::{Backend, BufferOf, DepthViewOf, DeviceSource, RenderDevice};
pub use pass::{ColorAttachmentConfig, DepthStencilConfig, RenderPassConfig, CLEAR_COLOR, DEPTH_FORMAT};
pub use renderer::{FrameRenderer, FrameStatus};
pub use scene::{Camera, Drawable, Scene, CAMERA_UNIFORM_SIZE, LIGHT_DATA_SIZE};
