//! 3D mesh rendering pass with depth testing.
//!
//! Two bind groups drive the shader:
//! - **Group 0**: camera uniforms (view-projection matrix, camera position)
//! - **Group 1**: model uniforms (model matrix, normal matrix, color), bound
//!   with a dynamic offset per draw call
//!
//! Model uniforms for the whole frame are packed into one buffer at aligned
//! offsets. Queued buffer writes all land before the encoded draws execute,
//! so per-draw offsets are required for each mesh to keep its own matrix.

use glam::Mat4;
use log::warn;

use crate::camera::Camera;
use crate::draw2d::Color;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
}

/// Dynamic-offset stride; `min_uniform_buffer_offset_alignment` is at most
/// 256 on the default limits.
const MODEL_STRIDE: u64 = 256;
/// More than the room ever draws in one frame.
const MAX_DRAWS: u64 = 512;

/// One mesh to render this frame.
pub struct MeshDraw<'a> {
    pub mesh: &'a Mesh,
    pub model: Mat4,
    pub color: Color,
}

/// Renders 3D meshes with back-face culling and a Depth32Float buffer.
pub struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    pipeline_layout: wgpu::PipelineLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    pub(crate) depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    pub fn new(gpu: &GpuContext, shader_source: &str) -> Self {
        let device = &gpu.device;

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: MODEL_STRIDE * MAX_DRAWS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ModelUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = build_pipeline(gpu, &pipeline_layout, shader_source);
        let (depth_view, depth_size) = create_depth_texture(gpu);

        Self {
            pipeline,
            pipeline_layout,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            depth_view,
            depth_size,
        }
    }

    /// Swaps in a recompiled pipeline from new shader source. On a shader
    /// that fails to compile, logs and keeps the previous pipeline.
    pub fn rebuild_pipeline(&mut self, gpu: &GpuContext, shader_source: &str) -> bool {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            build_pipeline(gpu, &self.pipeline_layout, shader_source)
        }));
        match result {
            Ok(pipeline) => {
                self.pipeline = pipeline;
                true
            }
            Err(_) => {
                warn!("mesh shader failed to compile, keeping the previous pipeline");
                false
            }
        }
    }

    /// Recreates the depth buffer when the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (view, size) = create_depth_texture(gpu);
            self.depth_view = view;
            self.depth_size = size;
        }
    }

    /// Renders the frame's draw list. Draws beyond [`MAX_DRAWS`] are
    /// silently dropped.
    pub fn render(
        &self,
        gpu: &GpuContext,
        render_pass: &mut wgpu::RenderPass,
        camera: &Camera,
        draws: &[MeshDraw],
    ) {
        if draws.is_empty() {
            return;
        }

        let camera_uniforms = CameraUniforms {
            view_proj: camera.view_projection(gpu.aspect()).to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        };
        gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniforms]),
        );

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for (i, draw) in draws.iter().take(MAX_DRAWS as usize).enumerate() {
            let normal_matrix = draw.model.inverse().transpose();
            let model_uniforms = ModelUniforms {
                model: draw.model.to_cols_array_2d(),
                normal_matrix: normal_matrix.to_cols_array_2d(),
                color: draw.color.to_array(),
            };

            let offset = i as u64 * MODEL_STRIDE;
            gpu.queue.write_buffer(
                &self.model_buffer,
                offset,
                bytemuck::cast_slice(&[model_uniforms]),
            );

            render_pass.set_bind_group(1, &self.model_bind_group, &[offset as u32]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
        }
    }
}

fn build_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader_source: &str,
) -> wgpu::RenderPipeline {
    let shader = gpu
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

fn create_depth_texture(gpu: &GpuContext) -> (wgpu::TextureView, (u32, u32)) {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: gpu.width(),
            height: gpu.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (view, (gpu.width(), gpu.height()))
}
