//! GPU mesh geometry and the procedural primitives the room is built from.
//!
//! [`Vertex3d`] is the vertex format for every mesh: position and normal,
//! 24 bytes, `#[repr(C)]` for upload. [`Mesh`] owns the GPU buffers.
//!
//! The primitives are all unit-sized (spanning -1..1) so instances can be
//! placed with plain scale/translate matrices whose factors read directly
//! as half-extents.

use crate::gpu::GpuContext;

/// A vertex with position and surface normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex3d {
    /// Vertex buffer layout: position at location 0, normal at location 1.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// GPU-resident geometry with vertex and index buffers.
///
/// Front faces wind counter-clockwise; custom geometry should follow the
/// same convention for correct backface culling.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Uploads the given geometry; the mesh renders immediately after.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// A box spanning -1..1 on every axis, with per-face normals.
    pub fn unit_box(gpu: &GpuContext) -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // Front face (Z+)
            Vertex3d::new([-1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([ 1.0, -1.0,  1.0], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([ 1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0]),
            Vertex3d::new([-1.0,  1.0,  1.0], [ 0.0,  0.0,  1.0]),
            // Back face (Z-)
            Vertex3d::new([ 1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([-1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0]),
            Vertex3d::new([ 1.0,  1.0, -1.0], [ 0.0,  0.0, -1.0]),
            // Top face (Y+)
            Vertex3d::new([-1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([ 1.0,  1.0,  1.0], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([ 1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0]),
            Vertex3d::new([-1.0,  1.0, -1.0], [ 0.0,  1.0,  0.0]),
            // Bottom face (Y-)
            Vertex3d::new([-1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([ 1.0, -1.0, -1.0], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([ 1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0]),
            Vertex3d::new([-1.0, -1.0,  1.0], [ 0.0, -1.0,  0.0]),
            // Right face (X+)
            Vertex3d::new([ 1.0, -1.0,  1.0], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([ 1.0, -1.0, -1.0], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([ 1.0,  1.0, -1.0], [ 1.0,  0.0,  0.0]),
            Vertex3d::new([ 1.0,  1.0,  1.0], [ 1.0,  0.0,  0.0]),
            // Left face (X-)
            Vertex3d::new([-1.0, -1.0, -1.0], [-1.0,  0.0,  0.0]),
            Vertex3d::new([-1.0, -1.0,  1.0], [-1.0,  0.0,  0.0]),
            Vertex3d::new([-1.0,  1.0,  1.0], [-1.0,  0.0,  0.0]),
            Vertex3d::new([-1.0,  1.0, -1.0], [-1.0,  0.0,  0.0]),
        ];

        #[rustfmt::skip]
        let indices: Vec<u32> = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        Self::new(gpu, &vertices, &indices)
    }

    /// A radius-1 UV sphere centered at the origin.
    pub fn unit_sphere(gpu: &GpuContext, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();
                vertices.push(Vertex3d::new([x, y, z], [x, y, z]));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.push(current);
                indices.push(next);
                indices.push(current + 1);

                indices.push(current + 1);
                indices.push(next);
                indices.push(next + 1);
            }
        }

        Self::new(gpu, &vertices, &indices)
    }

    /// A 2x2 horizontal plane at y = 0, facing up.
    pub fn unit_plane(gpu: &GpuContext) -> Self {
        let vertices = vec![
            Vertex3d::new([-1.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            Vertex3d::new([1.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            Vertex3d::new([1.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            Vertex3d::new([-1.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ];

        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::new(gpu, &vertices, &indices)
    }
}
