//! Frame timing.
//!
//! The runtime keeps one `FrameClock` per window and ticks it before each
//! `App::on_frame`; the resulting `FrameTime` carries both the clamped frame
//! delta and the time since the clock started.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
