use anyhow::{Context, Result};

use crate::shader::{LinkError, LinkedProgram, StageCode, UniformBinding, Varying, VaryingType};

/// Fixed-function state for building a `ProgramPipeline`.
#[derive(Debug, Clone)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub color_format: wgpu::TextureFormat,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
}

/// GPU-side executable program: render pipeline plus the layout of its
/// uniforms (if any), all at `@group(0)`.
pub struct ProgramPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: Option<wgpu::BindGroupLayout>,
    uniforms: Vec<UniformBinding>,
}

impl ProgramPipeline {
    /// Creates shader modules and the render pipeline for `program`.
    ///
    /// The vertex buffer layout is checked against the vertex stage inputs
    /// first, so a mismatch is reported as a `LinkError` rather than a device
    /// validation panic.
    pub fn new(device: &wgpu::Device, program: &LinkedProgram, desc: &PipelineDesc<'_>) -> Result<Self> {
        check_vertex_layout(program.vertex_inputs(), desc.vertex_buffers)
            .with_context(|| format!("vertex buffers do not fit pipeline `{}`", desc.label))?;

        let uniforms = program.uniforms().to_vec();
        if let Some(u) = uniforms.iter().find(|u| u.group != 0) {
            return Err(LinkError::UnsupportedBindGroup {
                group: u.group,
                name: u.name.clone(),
            })
            .with_context(|| format!("cannot build pipeline `{}`", desc.label));
        }

        let vs_module = create_module(device, program.vertex());
        let fs_module = create_module(device, program.fragment());

        let uniform_layout = (!uniforms.is_empty()).then(|| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
                .iter()
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.binding,
                    visibility: u.visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(u.size),
                    },
                    count: None,
                })
                .collect();

            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(format!("{} uniforms bgl", desc.label).as_str()),
                entries: &entries,
            })
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = uniform_layout.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(format!("{} pipeline layout", desc.label).as_str()),
            bind_group_layouts: &bind_group_layouts,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(program.vertex().entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: desc.vertex_buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(program.fragment().entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "created pipeline `{}` ({:?}, {} uniform binding(s))",
            desc.label,
            desc.color_format,
            uniforms.len()
        );

        Ok(Self {
            pipeline,
            uniform_layout,
            uniforms,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layout for `@group(0)`; `None` when the program declares no uniforms.
    pub fn uniform_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.uniform_layout.as_ref()
    }

    pub fn uniforms(&self) -> &[UniformBinding] {
        &self.uniforms
    }
}

fn create_module(device: &wgpu::Device, code: &StageCode) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(code.label.as_str()),
        source: wgpu::ShaderSource::Wgsl(code.source.as_str().into()),
    })
}

/// Checks that every vertex stage input is fed by an attribute of the same type.
///
/// Attribute formats without a known shader-side type are not checked.
pub fn check_vertex_layout(
    inputs: &[Varying],
    buffers: &[wgpu::VertexBufferLayout<'_>],
) -> Result<(), LinkError> {
    for input in inputs {
        let attr = buffers
            .iter()
            .flat_map(|b| b.attributes.iter())
            .find(|a| a.shader_location == input.location);

        let Some(attr) = attr else {
            return Err(LinkError::MissingAttribute {
                location: input.location,
                name: input.name.clone(),
            });
        };

        match VaryingType::from_vertex_format(attr.format) {
            Some(ty) if ty != input.ty => {
                return Err(LinkError::AttributeMismatch {
                    location: input.location,
                    expected: input.ty,
                    found: attr.format,
                });
            }
            Some(_) => {}
            None => log::debug!(
                "vertex attribute @location({}) uses {:?}; type not checked",
                input.location,
                attr.format
            ),
        }
    }
    Ok(())
}
