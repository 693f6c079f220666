use trigon_engine::device::{GpuInit, HeadlessGpu};
use trigon_engine::paint::Color;
use trigon_engine::render::{RenderCtx, RenderTarget, TransformUniform, TriangleMesh, TriangleRenderer};
use trigon_engine::shader::{ShaderSource, build_program};

const SIZE: u32 = 64;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
// 64 px * 4 bytes already satisfies COPY_BYTES_PER_ROW_ALIGNMENT.
const BYTES_PER_ROW: u32 = SIZE * 4;

const CLEAR: Color = Color::rgba(0.2, 0.3, 0.3, 1.0);

const FIXED_VS: &str = "
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
";

const FIXED_FS: &str = "
@fragment
fn main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
    return vertex_color;
}
";

const ROTATE_VS: &str = "
struct Transform {
    position: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> transform: Transform;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) vertex_color: vec4<f32>,
}

@vertex
fn main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform.position * vec4<f32>(position, 1.0);
    out.vertex_color = color + transform.color;
    return out;
}
";

const ROTATE_FS: &str = "
@fragment
fn main(@location(0) vertex_color: vec4<f32>) -> @location(0) vec4<f32> {
    return vertex_color;
}
";

fn headless() -> Option<HeadlessGpu> {
    match pollster::block_on(HeadlessGpu::new(&GpuInit::default())) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping: no GPU adapter available ({err:#})");
            None
        }
    }
}

/// Clears an offscreen target, draws one triangle and reads the pixels back.
fn draw_offscreen(gpu: &HeadlessGpu, renderer: &mut TriangleRenderer) -> Vec<u8> {
    let device = gpu.device();
    let queue = gpu.queue();

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (BYTES_PER_ROW * SIZE) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("offscreen encoder"),
    });

    {
        let rctx = RenderCtx::new(device, queue, FORMAT);
        let mut target = RenderTarget::new(&mut encoder, &view);
        target.clear(CLEAR);
        renderer.render(&rctx, &mut target).expect("triangle renders");
    }

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_ROW),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = readback.slice(..);
    slice.map_async(wgpu::MapMode::Read, |res| res.expect("readback maps"));
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("device poll");

    let pixels = slice.get_mapped_range().to_vec();
    readback.unmap();
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = (y * BYTES_PER_ROW + x * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

fn assert_close(actual: [u8; 4], expected: [u8; 4]) {
    let close = actual
        .iter()
        .zip(expected)
        .all(|(a, e)| a.abs_diff(e) <= 1);
    assert!(close, "pixel {actual:?} differs from {expected:?}");
}

#[test]
fn fixed_color_triangle_covers_center() {
    let Some(gpu) = headless() else { return };

    let program = build_program(&ShaderSource::vertex(FIXED_VS), &ShaderSource::fragment(FIXED_FS))
        .expect("fixed-color program builds");
    let mut renderer = TriangleRenderer::new(program, TriangleMesh::positions());

    let pixels = draw_offscreen(&gpu, &mut renderer);

    assert_close(pixel(&pixels, SIZE / 2, SIZE / 2), [128, 255, 0, 255]);
    assert_close(pixel(&pixels, 0, 0), CLEAR.to_rgba8());
    assert_close(pixel(&pixels, SIZE - 1, SIZE - 1), CLEAR.to_rgba8());
}

#[test]
fn transform_uniform_reaches_the_shader() {
    let Some(gpu) = headless() else { return };

    let program = build_program(&ShaderSource::vertex(ROTATE_VS), &ShaderSource::fragment(ROTATE_FS))
        .expect("rotate program builds");
    let mut renderer = TriangleRenderer::new(program, TriangleMesh::colored());

    // At t = 0 the triangle is unrotated and the added green is 0.5.
    renderer.set_transform(TransformUniform::at(0.0));
    let pixels = draw_offscreen(&gpu, &mut renderer);

    let [r, g, b, a] = pixel(&pixels, SIZE / 2, SIZE / 2);
    assert_eq!(a, 255);
    assert!(g >= 128, "green offset missing: {:?}", [r, g, b, a]);
    assert!(r > 0 && b > 0, "vertex colors not interpolated: {:?}", [r, g, b, a]);
    assert_close(pixel(&pixels, 0, 0), CLEAR.to_rgba8());
}
