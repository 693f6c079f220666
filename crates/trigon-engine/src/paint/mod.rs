//! Color representation shared by the frame loop and renderers.

mod color;

pub use color::Color;
