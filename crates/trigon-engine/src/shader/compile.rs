use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::CompileError;
use super::interface::{StageInterface, UniformBinding, uniform_bindings};
use super::source::{ShaderSource, ShaderStage};

/// A shader stage that parsed, validated and exposes an entry point.
///
/// Owns the validated module. Dropping it releases the module; a program
/// linked from it keeps its own copy of what the GPU layer needs.
#[derive(Debug)]
pub struct CompiledShader {
    stage: ShaderStage,
    label: String,
    entry_point: String,
    source: String,
    module: naga::Module,
    inputs: StageInterface,
    outputs: StageInterface,
    uniforms: Vec<UniformBinding>,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub fn uniforms(&self) -> &[UniformBinding] {
        &self.uniforms
    }

    pub(crate) fn inputs(&self) -> &StageInterface {
        &self.inputs
    }

    pub(crate) fn outputs(&self) -> &StageInterface {
        &self.outputs
    }
}

/// Compiles one shader stage.
///
/// Failures are logged with the failing stage and returned; the caller decides
/// whether to continue.
pub fn compile(source: &ShaderSource) -> Result<CompiledShader, CompileError> {
    let stage = source.stage();
    let label = source.label().into_owned();

    let result = compile_stage(source, stage, label);
    match &result {
        Ok(shader) => log::debug!(
            "compiled {stage} shader `{}` (entry point `{}`)",
            shader.label,
            shader.entry_point
        ),
        Err(err) => log::error!("{stage} shader: {err}"),
    }
    result
}

fn compile_stage(
    source: &ShaderSource,
    stage: ShaderStage,
    label: String,
) -> Result<CompiledShader, CompileError> {
    let text = source.text();
    if text.trim().is_empty() {
        return Err(CompileError::EmptySource { stage, label });
    }

    let module = match naga::front::wgsl::parse_str(text) {
        Ok(m) => m,
        Err(e) => {
            return Err(CompileError::Syntax {
                stage,
                label,
                diagnostic: e.emit_to_string(text),
            });
        }
    };

    if let Err(e) = Validator::new(ValidationFlags::all(), Capabilities::empty()).validate(&module) {
        return Err(CompileError::Validation {
            stage,
            label,
            diagnostic: e.emit_to_string(text),
        });
    }

    let wanted = source.entry_point();
    let Some(ep) = module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == stage.to_naga())
        .find(|ep| wanted.is_none_or(|name| ep.name == name))
    else {
        return Err(CompileError::MissingEntryPoint {
            stage,
            label,
            name: wanted.map(str::to_string),
        });
    };

    let mut inputs = StageInterface::default();
    for arg in &ep.function.arguments {
        inputs.collect(&module, arg.ty, arg.binding.as_ref(), arg.name.as_deref());
    }

    let mut outputs = StageInterface::default();
    if let Some(result) = &ep.function.result {
        outputs.collect(&module, result.ty, result.binding.as_ref(), None);
    }

    let entry_point = ep.name.clone();
    let uniforms = uniform_bindings(&module, stage.to_wgpu());

    Ok(CompiledShader {
        stage,
        label,
        entry_point,
        source: text.to_string(),
        module,
        inputs,
        outputs,
        uniforms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
        struct VertexOutput {
            @builtin(position) clip_position: vec4<f32>,
            @location(0) vertex_color: vec4<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
            var out: VertexOutput;
            out.clip_position = vec4<f32>(position, 1.0);
            out.vertex_color = vec4<f32>(0.5, 1.0, 0.0, 1.0);
            return out;
        }
    "#;

    const FRAGMENT: &str = r#"
        @fragment
        fn fs_main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
            return vertex_color;
        }
    "#;

    #[test]
    fn valid_vertex_source_compiles() {
        let shader = compile(&ShaderSource::vertex(VERTEX)).expect("vertex compiles");
        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert_eq!(shader.entry_point(), "vs_main");
        assert_eq!(shader.outputs().varyings.len(), 1);
        assert_eq!(shader.inputs().varyings.len(), 1);
        assert_eq!(shader.inputs().varyings[0].name.as_deref(), Some("position"));
    }

    #[test]
    fn valid_fragment_source_compiles() {
        let shader = compile(&ShaderSource::fragment(FRAGMENT)).expect("fragment compiles");
        assert_eq!(shader.entry_point(), "fs_main");
        assert_eq!(shader.inputs().varyings.len(), 1);
        assert!(shader.uniforms().is_empty());
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let broken = VERTEX.replace("1.0, 0.0, 1.0);", "1.0, 0.0, 1.0)");
        let err = compile(&ShaderSource::vertex(broken)).unwrap_err();
        assert!(matches!(err, CompileError::Syntax { stage: ShaderStage::Vertex, .. }));
        assert!(!err.diagnostic().trim().is_empty());
    }

    #[test]
    fn undeclared_identifier_is_rejected() {
        let src = r#"
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let err = compile(&ShaderSource::fragment(src)).unwrap_err();
        assert_eq!(err.stage(), ShaderStage::Fragment);
        assert!(!err.diagnostic().is_empty());
    }

    #[test]
    fn type_error_fails() {
        let src = r#"
            @fragment
            fn main() -> @location(0) vec4<f32> {
                let x: f32 = vec2<f32>(1.0, 2.0);
                return vec4<f32>(x);
            }
        "#;
        let err = compile(&ShaderSource::fragment(src)).unwrap_err();
        assert!(!err.diagnostic().is_empty());
    }

    #[test]
    fn empty_source_is_rejected() {
        let err = compile(&ShaderSource::vertex("   \n")).unwrap_err();
        assert!(matches!(err, CompileError::EmptySource { .. }));
        assert!(!err.diagnostic().is_empty());
    }

    #[test]
    fn stage_without_entry_point_is_rejected() {
        let err = compile(&ShaderSource::vertex(FRAGMENT)).unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingEntryPoint {
                stage: ShaderStage::Vertex,
                label: "vertex shader".to_string(),
                name: None,
            }
        );
    }

    #[test]
    fn named_entry_point_must_exist() {
        let src = ShaderSource::fragment(FRAGMENT).with_entry_point("main");
        let err = compile(&src).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingEntryPoint { name: Some(ref n), .. } if n == "main"
        ));
    }

    #[test]
    fn long_diagnostics_are_not_truncated() {
        let ident = format!("undefined_{}", "c".repeat(600));
        let src = format!(
            "@fragment fn main() -> @location(0) vec4<f32> {{\n    return {ident};\n}}\n"
        );

        let err = compile(&ShaderSource::fragment(src)).unwrap_err();
        let diagnostic = err.diagnostic();
        assert!(diagnostic.len() > 511);
        assert!(diagnostic.contains(&ident));
    }
}
