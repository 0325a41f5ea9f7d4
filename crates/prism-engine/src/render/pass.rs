/// Clear color of the frame pass (opaque mid gray).
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

/// Format of the depth/stencil attachment.
///
/// Pipelines drawing into the frame pass must declare this depth format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Color attachment of the frame pass.
///
/// Carries no view: the acquired swapchain image is bound when the pass begins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorAttachmentConfig {
    pub ops: wgpu::Operations<wgpu::Color>,
}

impl Default for ColorAttachmentConfig {
    fn default() -> Self {
        Self {
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        }
    }
}

/// Depth/stencil attachment of the frame pass.
#[derive(Debug, Clone)]
pub struct DepthStencilConfig<V> {
    pub view: V,
    pub depth_ops: wgpu::Operations<f32>,
    pub stencil_ops: wgpu::Operations<u32>,
}

/// Attachments of the single frame pass.
///
/// Built once at init; afterwards only the depth view is ever replaced.
#[derive(Debug, Clone)]
pub struct RenderPassConfig<V> {
    pub color: ColorAttachmentConfig,
    pub depth_stencil: DepthStencilConfig<V>,
}

impl<V> RenderPassConfig<V> {
    /// Depth is cleared to 1.0 and stored; stencil is loaded and stored.
    pub fn new(depth_view: V) -> Self {
        Self {
            color: ColorAttachmentConfig::default(),
            depth_stencil: DepthStencilConfig {
                view: depth_view,
                depth_ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                },
                stencil_ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            },
        }
    }

    /// Binds a new depth view and returns the previous one.
    pub fn rebind_depth_view(&mut self, view: V) -> V {
        std::mem::replace(&mut self.depth_stencil.view, view)
    }
}
