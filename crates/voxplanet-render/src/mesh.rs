use glam::Mat4;
use voxplanet_core::{validate_vertices, ChunkMesh, FlatVertex};
use wgpu::util::DeviceExt;

use crate::bindings::BindingLayouts;
use crate::error::RenderError;
use crate::schema::{ModelUniform, Uniform};

/// Vertex and index buffers of one drawable.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Atlas level to sample; 1 for full resolution.
    pub detail: u32,
}

impl GpuMesh {
    /// Upload a chunk mesh. Vertices are validated first; an undefined normal selector
    /// would otherwise render silently wrong.
    pub fn upload(device: &wgpu::Device, mesh: &ChunkMesh) -> Result<Self, RenderError> {
        validate_vertices(&mesh.vertices)?;
        Ok(Self {
            detail: mesh.detail.max(1),
            ..Self::create(
                device,
                "chunk",
                bytemuck::cast_slice(&mesh.vertices),
                &mesh.indices,
            )
        })
    }

    /// Upload float vertices for UI quads and planet meshes.
    pub fn from_flat(
        device: &wgpu::Device,
        label: &str,
        vertices: &[FlatVertex],
        indices: &[u32],
    ) -> Self {
        Self::create(device, label, bytemuck::cast_slice(vertices), indices)
    }

    fn create(device: &wgpu::Device, label: &str, vertex_bytes: &[u8], indices: &[u32]) -> Self {
        let vertex_label = format!("{label}-vertices");
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(vertex_label.as_str()),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_label = format!("{label}-indices");
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(index_label.as_str()),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            detail: 1,
        }
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Per-object model uniform and its bind group.
pub struct ModelBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ModelBinding {
    pub fn new(device: &wgpu::Device, layouts: &BindingLayouts, model: Mat4) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model-uniform"),
            contents: bytemuck::bytes_of(&ModelUniform::new(model)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model-bg"),
            layout: layouts.get(ModelUniform::SLOT),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&ModelUniform::new(model)));
    }
}
