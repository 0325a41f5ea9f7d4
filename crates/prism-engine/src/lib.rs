//! Prism engine crate.
//!
//! A minimal wgpu frame renderer: one render pass per frame with a color and a
//! depth/stencil target, a camera and a light uniform, and scene objects that
//! draw themselves. Also carries the window runtime that drives it.

pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
