//! GPU-resident meshes

use wgpu::util::DeviceExt;

use crate::{
    error::{EngineError, EngineResult},
    gfx::geometry::MeshData,
    wgpu_utils::scoped,
};

/// Immutable vertex and index buffers for one drawable shape
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Uploads `data` into buffers sized exactly to its element counts
    ///
    /// The buffers carry only `VERTEX` / `INDEX` usage, so neither can be
    /// read back or written once created.
    ///
    /// # Arguments
    /// * `device` - Device owning the buffers
    /// * `data` - Vertices and triangle-list indices
    /// * `label` - Debug label, usually the asset key
    pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> EngineResult<Self> {
        if data.is_empty() {
            return Err(EngineError::ResourceCreation {
                label: label.to_owned(),
                message: "mesh has no vertices or indices".to_owned(),
            });
        }

        let (vertex_buffer, index_buffer) = scoped(device, label, || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        })?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertex_count() as u32,
            index_count: data.index_count() as u32,
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
