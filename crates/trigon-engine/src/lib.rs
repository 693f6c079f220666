//! Trigon engine crate.
//!
//! Shader compilation and linking on top of naga, plus the window, GPU and
//! render-loop pieces the lessons draw their triangle with.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;
