use crate::render::RenderTarget;

/// One acquired surface texture with its view and command encoder.
///
/// Hand it back to `Gpu::submit` within the same frame; the next acquisition
/// waits until this texture is presented.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Borrows the encoder and view as a draw target.
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.encoder, &self.view)
    }
}
