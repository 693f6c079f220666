use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};
use crate::shader::LinkedProgram;

use super::pipeline::{PipelineDesc, ProgramPipeline};
use super::transform::TransformUniform;

/// Position-only vertex (`@location(0) vec3<f32>`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

impl PositionVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PositionVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Position + color vertex (`@location(0) vec3<f32>`, `@location(1) vec4<f32>`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The hardcoded triangle, in one of two vertex formats.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TriangleMesh {
    Positions([PositionVertex; 3]),
    Colored([ColorVertex; 3]),
}

impl TriangleMesh {
    /// Left, right, top.
    pub const fn positions() -> Self {
        TriangleMesh::Positions([
            PositionVertex { position: [-0.5, -0.5, 0.0] },
            PositionVertex { position: [0.5, -0.5, 0.0] },
            PositionVertex { position: [0.0, 0.5, 0.0] },
        ])
    }

    /// Red, green and blue corners with zero alpha; the transform uniform
    /// supplies the alpha.
    pub const fn colored() -> Self {
        TriangleMesh::Colored([
            ColorVertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0, 0.0] },
            ColorVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0, 0.0] },
            ColorVertex { position: [0.0, 0.5, 0.0], color: [0.0, 0.0, 1.0, 0.0] },
        ])
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        match self {
            TriangleMesh::Positions(_) => PositionVertex::layout(),
            TriangleMesh::Colored(_) => ColorVertex::layout(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            TriangleMesh::Positions(v) => bytemuck::cast_slice(v),
            TriangleMesh::Colored(v) => bytemuck::cast_slice(v),
        }
    }

    pub const fn vertex_count(&self) -> u32 {
        3
    }
}

/// Draws one triangle with a linked program.
///
/// GPU resources are created lazily on the first `render` and rebuilt when the
/// target format changes. If the program declares a uniform, it must be the
/// single `TransformUniform` at `@group(0) @binding(0)`.
pub struct TriangleRenderer {
    program: LinkedProgram,
    mesh: TriangleMesh,
    transform: TransformUniform,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<ProgramPipeline>,

    vbo: Option<wgpu::Buffer>,
    transform_ubo: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
}

impl TriangleRenderer {
    pub fn new(program: LinkedProgram, mesh: TriangleMesh) -> Self {
        Self {
            program,
            mesh,
            transform: TransformUniform::IDENTITY,
            pipeline_format: None,
            pipeline: None,
            vbo: None,
            transform_ubo: None,
            bind_group: None,
        }
    }

    pub fn program(&self) -> &LinkedProgram {
        &self.program
    }

    /// Sets the uniform value uploaded before the next draw.
    ///
    /// Ignored by programs without uniforms.
    pub fn set_transform(&mut self, transform: TransformUniform) {
        self.transform = transform;
    }

    /// Records a render pass drawing the triangle over the current contents of `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<()> {
        self.ensure_pipeline(ctx)?;
        self.ensure_vertex_buffer(ctx);
        self.ensure_bindings(ctx);
        self.write_transform(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(vbo) = self.vbo.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trigon triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline.pipeline());
        if let Some(bind_group) = self.bind_group.as_ref() {
            rpass.set_bind_group(0, bind_group, &[]);
        }
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..self.mesh.vertex_count(), 0..1);

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }

        check_uniforms(&self.program)?;

        let layouts = [self.mesh.layout()];
        let pipeline = ProgramPipeline::new(
            ctx.device,
            &self.program,
            &PipelineDesc {
                label: "trigon triangle pipeline",
                color_format: ctx.surface_format,
                vertex_buffers: &layouts,
            },
        )
        .context("failed to create triangle pipeline")?;

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);

        // Bind group references the old layout.
        self.bind_group = None;
        Ok(())
    }

    fn ensure_vertex_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.vbo.is_some() {
            return;
        }

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trigon triangle vbo"),
            contents: self.mesh.bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(layout) = self.pipeline.as_ref().and_then(|p| p.uniform_layout()) else {
            return;
        };

        let ubo = self.transform_ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("trigon transform ubo"),
                size: std::mem::size_of::<TransformUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trigon transform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
    }

    fn write_transform(&self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.transform_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&self.transform));
    }
}

/// The renderer only knows how to feed one `TransformUniform` at binding 0.
fn check_uniforms(program: &LinkedProgram) -> Result<()> {
    let expected = std::mem::size_of::<TransformUniform>() as u64;
    match program.uniforms() {
        [] => Ok(()),
        [u] if u.group == 0 && u.binding == 0 && u.size == expected => Ok(()),
        [u] => anyhow::bail!(
            "uniform {:?} at @group({}) @binding({}) is {} bytes; the triangle renderer supplies a {expected}-byte transform at @group(0) @binding(0)",
            u.name,
            u.group,
            u.binding,
            u.size
        ),
        many => anyhow::bail!(
            "program declares {} uniforms; the triangle renderer supplies one",
            many.len()
        ),
    }
}
