//! Frame timing.
//!
//! One [`FrameClock`] per window; call `tick()` once per redraw to obtain a
//! [`FrameTime`] for animating cameras and lights.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
