// src/wgpu_utils/binding_types.rs
//! WGPU binding type utilities

/// Uniform buffer addressed with a dynamic offset per draw
pub fn uniform_dynamic<Content>() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
    }
}

/// Layout entry for a dynamic uniform visible to the vertex stage
pub fn vertex_uniform_entry<Content>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: uniform_dynamic::<Content>(),
        count: None,
    }
}
