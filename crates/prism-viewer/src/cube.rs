use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use prism_engine::device::WgpuBackend;
use prism_engine::render::{Drawable, CAMERA_UNIFORM_SIZE, DEPTH_FORMAT, LIGHT_DATA_SIZE};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct CubeVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x3  // normal
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Per-cube uniform: world transform + base color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ModelUniform {
    transform: [f32; 16],
    color: [f32; 4],
}

/// Unit cube centered on the origin: 4 vertices per face so each face has a flat normal.
pub(crate) fn cube_mesh() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal, tangent u, tangent v); u x v == normal keeps faces CCW from outside.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (n, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = 0.5 * (n + su * u + sv * v);
            vertices.push(CubeVertex {
                pos: p.to_array(),
                normal: n.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// GPU state shared by every cube: pipeline, layout and mesh buffers.
pub(crate) struct CubeMaterial {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl CubeMaterial {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism cube shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
        });

        let uniform_entry = |binding, visibility, size| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism cube bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, CAMERA_UNIFORM_SIZE),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, LIGHT_DATA_SIZE),
                uniform_entry(
                    2,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    std::mem::size_of::<ModelUniform>() as u64,
                ),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism cube pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("prism cube pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Must match the frame pass's depth/stencil attachment.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let (vertices, indices) = cube_mesh();

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism cube vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism cube ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            bind_group_layout,
            vbo,
            ibo,
            index_count: indices.len() as u32,
        }
    }
}

/// One lit cube. Reads the renderer's camera and light buffers.
pub struct Cube {
    material: Rc<CubeMaterial>,
    bind_group: wgpu::BindGroup,
}

impl Cube {
    pub(crate) fn new(
        device: &wgpu::Device,
        material: Rc<CubeMaterial>,
        camera_ubo: &wgpu::Buffer,
        light_ubo: &wgpu::Buffer,
        transform: Mat4,
        color: [f32; 4],
    ) -> Self {
        let model = ModelUniform {
            transform: transform.to_cols_array(),
            color,
        };

        let model_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism cube model ubo"),
            contents: bytemuck::bytes_of(&model),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism cube bind group"),
            layout: &material.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: model_ubo.as_entire_binding(),
                },
            ],
        });

        Self {
            material,
            bind_group,
        }
    }
}

impl Drawable<WgpuBackend> for Cube {
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, _device: &wgpu::Device) {
        let m = &self.material;
        pass.set_pipeline(&m.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, m.vbo.slice(..));
        pass.set_index_buffer(m.ibo.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..m.index_count, 0, 0..1);
    }
}
