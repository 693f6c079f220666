use super::compile::{CompiledShader, compile};
use super::error::{LinkError, ShaderError};
use super::interface::{UniformBinding, Varying};
use super::source::{ShaderSource, ShaderStage};

/// What the GPU layer needs to build one stage of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StageCode {
    pub label: String,
    pub source: String,
    pub entry_point: String,
}

impl StageCode {
    fn from_shader(shader: &CompiledShader) -> Self {
        Self {
            label: shader.label().to_string(),
            source: shader.source().to_string(),
            entry_point: shader.entry_point().to_string(),
        }
    }
}

/// A vertex + fragment pair whose interfaces agree.
///
/// Independent of the compiled shaders it was linked from; those may be
/// dropped right after `link` returns.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedProgram {
    vertex: StageCode,
    fragment: StageCode,
    vertex_inputs: Vec<Varying>,
    uniforms: Vec<UniformBinding>,
}

impl LinkedProgram {
    pub fn vertex(&self) -> &StageCode {
        &self.vertex
    }

    pub fn fragment(&self) -> &StageCode {
        &self.fragment
    }

    /// Attributes the vertex stage reads, by location.
    pub fn vertex_inputs(&self) -> &[Varying] {
        &self.vertex_inputs
    }

    /// Uniforms declared by either stage, merged per slot.
    pub fn uniforms(&self) -> &[UniformBinding] {
        &self.uniforms
    }
}

/// Links a compiled vertex and fragment shader into a program.
///
/// One attempt per call; failures are logged and returned.
pub fn link(vertex: &CompiledShader, fragment: &CompiledShader) -> Result<LinkedProgram, LinkError> {
    let result = link_stages(vertex, fragment);
    match &result {
        Ok(_) => log::debug!(
            "linked program from `{}` + `{}`",
            vertex.label(),
            fragment.label()
        ),
        Err(err) => log::error!("program link failed: {err}"),
    }
    result
}

/// Compiles both sources and links them.
///
/// Both stages are compiled (and any failure logged) before the first error
/// is returned, so one run reports every broken stage.
pub fn build_program(
    vertex: &ShaderSource,
    fragment: &ShaderSource,
) -> Result<LinkedProgram, ShaderError> {
    let vs = compile(vertex);
    let fs = compile(fragment);
    let (vs, fs) = (vs?, fs?);

    Ok(link(&vs, &fs)?)
}

fn link_stages(vertex: &CompiledShader, fragment: &CompiledShader) -> Result<LinkedProgram, LinkError> {
    expect_stage(vertex, ShaderStage::Vertex)?;
    expect_stage(fragment, ShaderStage::Fragment)?;

    let outputs = vertex.outputs();
    for input in &fragment.inputs().varyings {
        let Some(output) = outputs.find(input.location) else {
            return Err(LinkError::MissingOutput {
                location: input.location,
                name: input.name.clone(),
            });
        };
        if output.ty != input.ty {
            return Err(LinkError::TypeMismatch {
                location: input.location,
                vertex: output.ty,
                fragment: input.ty,
            });
        }
        if output.interpolant != input.interpolant {
            return Err(LinkError::InterpolationMismatch {
                location: input.location,
                vertex: output.interpolant,
                fragment: input.interpolant,
            });
        }
    }

    // Unread vertex outputs are fine.
    Ok(LinkedProgram {
        vertex: StageCode::from_shader(vertex),
        fragment: StageCode::from_shader(fragment),
        vertex_inputs: vertex.inputs().varyings.clone(),
        uniforms: merge_uniforms(vertex.uniforms(), fragment.uniforms()),
    })
}

fn expect_stage(shader: &CompiledShader, expected: ShaderStage) -> Result<(), LinkError> {
    if shader.stage() == expected {
        Ok(())
    } else {
        Err(LinkError::StageMismatch {
            expected,
            found: shader.stage(),
            label: shader.label().to_string(),
        })
    }
}

fn merge_uniforms(vertex: &[UniformBinding], fragment: &[UniformBinding]) -> Vec<UniformBinding> {
    let mut merged: Vec<UniformBinding> = vertex.to_vec();
    for u in fragment {
        match merged
            .iter_mut()
            .find(|m| m.group == u.group && m.binding == u.binding)
        {
            Some(existing) => {
                existing.visibility |= u.visibility;
                existing.size = existing.size.max(u.size);
            }
            None => merged.push(u.clone()),
        }
    }
    merged.sort_by_key(|u| (u.group, u.binding));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{CompileError, Interpolant, VaryingType};

    const VERTEX: &str = r#"
        struct VertexOutput {
            @builtin(position) clip_position: vec4<f32>,
            @location(0) vertex_color: vec4<f32>,
        }

        @vertex
        fn main(@location(0) position: vec3<f32>) -> VertexOutput {
            var out: VertexOutput;
            out.clip_position = vec4<f32>(position, 1.0);
            out.vertex_color = vec4<f32>(0.5, 1.0, 0.0, 1.0);
            return out;
        }
    "#;

    const FRAGMENT: &str = r#"
        @fragment
        fn main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
            return vertex_color;
        }
    "#;

    fn vs(src: &'static str) -> CompiledShader {
        compile(&ShaderSource::vertex(src)).expect("vertex compiles")
    }

    fn fs(src: &'static str) -> CompiledShader {
        compile(&ShaderSource::fragment(src)).expect("fragment compiles")
    }

    #[test]
    fn matching_interfaces_link() {
        let program = link(&vs(VERTEX), &fs(FRAGMENT)).expect("program links");
        assert_eq!(program.vertex().entry_point, "main");
        assert_eq!(program.vertex_inputs().len(), 1);
        assert_eq!(program.vertex_inputs()[0].ty, VaryingType::f32(3));
        assert!(program.uniforms().is_empty());
    }

    #[test]
    fn fragment_input_without_vertex_output_fails() {
        let fragment = fs(r#"
            @fragment
            fn main(@location(1) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#);

        let err = link(&vs(VERTEX), &fragment).unwrap_err();
        assert_eq!(
            err,
            LinkError::MissingOutput { location: 1, name: Some("tint".to_string()) }
        );
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn type_mismatch_fails() {
        let fragment = fs(r#"
            @fragment
            fn main(@location(0) vertex_color: vec3<f32>) -> @location(0) vec4<f32> {
                return vec4<f32>(vertex_color, 1.0);
            }
        "#);

        let err = link(&vs(VERTEX), &fragment).unwrap_err();
        assert_eq!(
            err,
            LinkError::TypeMismatch {
                location: 0,
                vertex: VaryingType::f32(4),
                fragment: VaryingType::f32(3),
            }
        );
    }

    #[test]
    fn flat_output_read_as_perspective_fails() {
        let vertex = vs(r#"
            struct VertexOutput {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) @interpolate(flat) vertex_color: vec4<f32>,
            }

            @vertex
            fn main(@location(0) position: vec3<f32>) -> VertexOutput {
                var out: VertexOutput;
                out.clip_position = vec4<f32>(position, 1.0);
                out.vertex_color = vec4<f32>(0.5, 1.0, 0.0, 1.0);
                return out;
            }
        "#);

        let err = link(&vertex, &fs(FRAGMENT)).unwrap_err();
        match err {
            LinkError::InterpolationMismatch { location, vertex, fragment } => {
                assert_eq!(location, 0);
                assert_eq!(vertex.interpolation, Some(naga::Interpolation::Flat));
                assert_eq!(fragment, Interpolant::PERSPECTIVE);
            }
            other => panic!("expected an interpolation mismatch, got {other:?}"),
        }
    }

    #[test]
    fn matching_flat_interpolation_links() {
        let vertex = vs(r#"
            struct VertexOutput {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) @interpolate(flat) vertex_color: vec4<f32>,
            }

            @vertex
            fn main(@location(0) position: vec3<f32>) -> VertexOutput {
                var out: VertexOutput;
                out.clip_position = vec4<f32>(position, 1.0);
                out.vertex_color = vec4<f32>(0.5, 1.0, 0.0, 1.0);
                return out;
            }
        "#);
        let fragment = fs(r#"
            @fragment
            fn main(@location(0) @interpolate(flat) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
                return vertex_color;
            }
        "#);

        assert!(link(&vertex, &fragment).is_ok());
    }

    #[test]
    fn swapped_stages_fail() {
        let err = link(&fs(FRAGMENT), &vs(VERTEX)).unwrap_err();
        assert!(matches!(
            err,
            LinkError::StageMismatch { expected: ShaderStage::Vertex, found: ShaderStage::Fragment, .. }
        ));
    }

    #[test]
    fn fragment_reading_nothing_links() {
        let fragment = fs(r#"
            @fragment
            fn main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 0.0, 0.0, 1.0);
            }
        "#);
        assert!(link(&vs(VERTEX), &fragment).is_ok());
    }

    #[test]
    fn uniforms_from_both_stages_are_merged() {
        let vertex = vs(r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            struct VertexOutput {
                @builtin(position) clip_position: vec4<f32>,
                @location(0) vertex_color: vec4<f32>,
            }

            @vertex
            fn main(@location(0) position: vec3<f32>) -> VertexOutput {
                var out: VertexOutput;
                out.clip_position = vec4<f32>(position, 1.0);
                out.vertex_color = tint;
                return out;
            }
        "#);
        let fragment = fs(r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            @fragment
            fn main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
                return vertex_color * tint;
            }
        "#);

        let program = link(&vertex, &fragment).expect("program links");
        assert_eq!(program.uniforms().len(), 1);
        assert_eq!(
            program.uniforms()[0].visibility,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT
        );
        assert_eq!(program.uniforms()[0].size, 16);
    }

    #[test]
    fn build_program_stops_on_compile_error() {
        let broken = ShaderSource::vertex("@vertex fn main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0) }");
        let err = build_program(&broken, &ShaderSource::fragment(FRAGMENT)).unwrap_err();
        match err {
            ShaderError::Compile(CompileError::Syntax { stage, diagnostic, .. }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected a vertex syntax error, got {other:?}"),
        }
    }

    #[test]
    fn build_program_links_valid_pair() {
        let program = build_program(&ShaderSource::vertex(VERTEX), &ShaderSource::fragment(FRAGMENT))
            .expect("program builds");
        assert_eq!(program.fragment().entry_point, "main");
    }
}
