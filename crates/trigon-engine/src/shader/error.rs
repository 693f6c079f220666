use std::fmt;

use super::interface::{Interpolant, VaryingType};
use super::source::ShaderStage;

/// The compiler rejected a shader source.
///
/// `diagnostic` carries the full compiler message, never truncated.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Source text is empty or whitespace only.
    EmptySource { stage: ShaderStage, label: String },

    /// WGSL did not parse.
    Syntax {
        stage: ShaderStage,
        label: String,
        diagnostic: String,
    },

    /// WGSL parsed but failed validation (types, undeclared names, ...).
    Validation {
        stage: ShaderStage,
        label: String,
        diagnostic: String,
    },

    /// No usable entry point for the declared stage.
    MissingEntryPoint {
        stage: ShaderStage,
        label: String,
        /// Requested name, if the source named one.
        name: Option<String>,
    },
}

impl CompileError {
    pub fn stage(&self) -> ShaderStage {
        match self {
            CompileError::EmptySource { stage, .. }
            | CompileError::Syntax { stage, .. }
            | CompileError::Validation { stage, .. }
            | CompileError::MissingEntryPoint { stage, .. } => *stage,
        }
    }

    /// Compiler output for this failure.
    pub fn diagnostic(&self) -> String {
        match self {
            CompileError::Syntax { diagnostic, .. }
            | CompileError::Validation { diagnostic, .. } => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::EmptySource { stage, label } => {
                write!(f, "{stage} shader `{label}` has no source text")
            }
            CompileError::Syntax { stage, label, diagnostic } => {
                write!(f, "{stage} shader `{label}` failed to parse:\n{diagnostic}")
            }
            CompileError::Validation { stage, label, diagnostic } => {
                write!(f, "{stage} shader `{label}` failed validation:\n{diagnostic}")
            }
            CompileError::MissingEntryPoint { stage, label, name: Some(name) } => {
                write!(f, "{stage} shader `{label}` has no {stage} entry point named `{name}`")
            }
            CompileError::MissingEntryPoint { stage, label, name: None } => {
                write!(f, "{stage} shader `{label}` declares no {stage} entry point")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Two compiled stages could not be combined into a program.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    /// A shader of the wrong stage was passed in a stage slot.
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
        label: String,
    },

    /// The fragment stage reads a location the vertex stage never writes.
    MissingOutput { location: u32, name: Option<String> },

    /// Both stages use the location, with different types.
    TypeMismatch {
        location: u32,
        vertex: VaryingType,
        fragment: VaryingType,
    },

    /// Both stages use the location, with different interpolation or sampling.
    InterpolationMismatch {
        location: u32,
        vertex: Interpolant,
        fragment: Interpolant,
    },

    /// A vertex input has no matching attribute in the vertex buffer layouts.
    MissingAttribute { location: u32, name: Option<String> },

    /// A vertex attribute format does not fit the shader input type.
    AttributeMismatch {
        location: u32,
        expected: VaryingType,
        found: wgpu::VertexFormat,
    },

    /// Uniforms outside bind group 0 are not supported by the pipeline layer.
    UnsupportedBindGroup { group: u32, name: Option<String> },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::StageMismatch { expected, found, label } => write!(
                f,
                "expected a {expected} shader in the {expected} slot, got {found} shader `{label}`"
            ),
            LinkError::MissingOutput { location, name } => write!(
                f,
                "fragment input {} at @location({location}) is not written by the vertex stage",
                display_name(name)
            ),
            LinkError::TypeMismatch { location, vertex, fragment } => write!(
                f,
                "@location({location}) is {vertex} in the vertex stage but {fragment} in the fragment stage"
            ),
            LinkError::InterpolationMismatch { location, vertex, fragment } => write!(
                f,
                "@location({location}) is written with {vertex} but read with {fragment}"
            ),
            LinkError::MissingAttribute { location, name } => write!(
                f,
                "vertex input {} at @location({location}) has no vertex buffer attribute",
                display_name(name)
            ),
            LinkError::AttributeMismatch { location, expected, found } => write!(
                f,
                "vertex attribute @location({location}) is {found:?} but the shader reads {expected}"
            ),
            LinkError::UnsupportedBindGroup { group, name } => write!(
                f,
                "uniform {} uses @group({group}); only @group(0) is supported",
                display_name(name)
            ),
        }
    }
}

impl std::error::Error for LinkError {}

fn display_name(name: &Option<String>) -> String {
    match name {
        Some(n) => format!("`{n}`"),
        None => "<unnamed>".to_string(),
    }
}

/// Failure of the combined compile + link path.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    Compile(CompileError),
    Link(LinkError),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Compile(e) => write!(f, "shader compilation failed: {e}"),
            ShaderError::Link(e) => write!(f, "program link failed: {e}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Compile(e) => Some(e),
            ShaderError::Link(e) => Some(e),
        }
    }
}

impl From<CompileError> for ShaderError {
    fn from(e: CompileError) -> Self {
        ShaderError::Compile(e)
    }
}

impl From<LinkError> for ShaderError {
    fn from(e: LinkError) -> Self {
        ShaderError::Link(e)
    }
}
