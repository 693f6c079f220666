//! Shader compilation and program linking.
//!
//! WGSL text is compiled by `naga`, the same front-end wgpu runs internally,
//! so diagnostics are produced before any GPU object exists. Linking checks
//! that the vertex stage writes every varying the fragment stage reads, with
//! the same type and interpolation.
//!
//! Typical flow:
//! - `compile` each `ShaderSource` into a `CompiledShader`
//! - `link` the vertex + fragment pair into a `LinkedProgram`
//! - drop the compiled shaders; the program keeps what the GPU layer needs

mod compile;
mod error;
mod interface;
mod link;
mod source;

pub use compile::{CompiledShader, compile};
pub use error::{CompileError, LinkError, ShaderError};
pub use interface::{Interpolant, ScalarKind, UniformBinding, Varying, VaryingType};
pub use link::{LinkedProgram, StageCode, build_program, link};
pub use source::{ShaderSource, ShaderStage};
