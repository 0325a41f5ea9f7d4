//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue for a window
//! - creating & configuring the Surface (swapchain)
//! - implementing [`RenderDevice`](crate::render::RenderDevice) on top of wgpu

mod error;
mod frame;
mod gpu;
mod init;
mod source;
pub(crate) mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, WgpuBackend};
pub use init::GpuInit;
pub use source::WindowSurface;
