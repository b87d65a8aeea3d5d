// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

use crate::error::{EngineError, EngineResult};

/// Uniform buffer holding one `Content` per draw, bound with a dynamic offset
///
/// Writes land in distinct slots, so every draw recorded in a frame keeps the
/// values it was given even though the queue applies all writes before the
/// command buffer runs.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    cursor: usize,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        match type_name.rfind(':') {
            Some(pos) => &type_name[(pos + 1)..],
            None => type_name,
        }
    }

    /// Size of one slot: `Content` rounded up to the device's offset alignment
    pub fn slot_stride(alignment: u32) -> u64 {
        let size = std::mem::size_of::<Content>() as u64;
        let alignment = u64::from(alignment.max(1));
        size.div_ceil(alignment) * alignment
    }

    /// Creates a buffer with room for `capacity` slots
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let stride = Self::slot_stride(device.limits().min_uniform_buffer_offset_alignment);
        let capacity = capacity.max(1);

        DynamicUniformBuffer {
            buffer: Self::allocate(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
            cursor: 0,
        }
    }

    fn allocate(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Rewinds the slot cursor and makes room for `slots` writes
    ///
    /// # Returns
    /// True when the buffer was reallocated (bind groups must be rebuilt)
    pub fn begin_frame(&mut self, device: &wgpu::Device, slots: usize) -> bool {
        self.cursor = 0;
        if slots <= self.capacity {
            return false;
        }

        let capacity = slots.next_power_of_two();
        log::debug!(
            "growing {} uniform slots {} -> {}",
            Self::name(),
            self.capacity,
            capacity
        );
        self.buffer = Self::allocate(device, self.stride, capacity);
        self.capacity = capacity;
        true
    }

    /// Writes `content` into the next free slot
    ///
    /// # Returns
    /// Dynamic offset of the written slot
    pub fn push(&mut self, queue: &wgpu::Queue, content: &Content) -> EngineResult<u32> {
        if self.cursor >= self.capacity {
            return Err(EngineError::UniformSlotsExhausted {
                capacity: self.capacity,
            });
        }

        let offset = self.cursor as u64 * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(content));
        self.cursor += 1;
        Ok(offset as u32)
    }

    /// Binding resource covering a single slot
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(std::mem::size_of::<Content>() as u64),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots written since the last [`begin_frame`](Self::begin_frame)
    pub fn used(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct ThreeMatrices([[[f32; 4]; 4]; 3]);

    #[test]
    fn stride_respects_alignment() {
        assert_eq!(DynamicUniformBuffer::<ThreeMatrices>::slot_stride(256), 256);
        assert_eq!(DynamicUniformBuffer::<ThreeMatrices>::slot_stride(64), 192);
        assert_eq!(DynamicUniformBuffer::<[f32; 4]>::slot_stride(256), 256);
    }
}
