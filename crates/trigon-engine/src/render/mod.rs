//! GPU rendering subsystem.
//!
//! Turns linked shader programs into wgpu pipelines and records the triangle
//! draw. Each renderer owns its GPU resources (pipeline, buffers).
//!
//! Convention:
//! - vertex positions are already in clip space (NDC, +Y up)
//! - per-frame values reach the vertex stage through `@group(0) @binding(0)`

mod ctx;
mod pipeline;
mod transform;
mod triangle;

pub use ctx::{RenderCtx, RenderTarget};
pub use pipeline::{PipelineDesc, ProgramPipeline, check_vertex_layout};
pub use transform::{ROTATION_SPEED, TransformUniform};
pub use triangle::{ColorVertex, PositionVertex, TriangleMesh, TriangleRenderer};
