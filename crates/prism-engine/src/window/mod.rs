//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and the frame renderer presenting into it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
