//! Per-object uniforms of one offscreen pass, in a single buffer.

use crate::context::Context;
use bytemuck::Pod;
use std::marker::PhantomData;
use std::mem;

/// Uniform entries addressed through dynamic offsets into one bind group.
///
/// Entries are staged on RAM during a pass and written with one `write_buffer`
/// call by [`DynamicUniformBuffer::flush`].
pub struct DynamicUniformBuffer<T: Pod> {
    staged: Vec<u8>,
    buffer: wgpu::Buffer,
    stride: u64,
    label: &'static str,
    _entry: PhantomData<T>,
}

impl<T: Pod> DynamicUniformBuffer<T> {
    /// A buffer with room for `entries` entries before it has to grow.
    pub fn with_capacity(ctxt: &Context, label: &'static str, entries: usize) -> Self {
        let alignment = ctxt.device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = Self::aligned_entry_size(alignment);

        DynamicUniformBuffer {
            staged: Vec::new(),
            buffer: Self::create(ctxt, label, stride * entries.max(1) as u64),
            stride,
            label,
            _entry: PhantomData,
        }
    }

    fn create(ctxt: &Context, label: &'static str, size: u64) -> wgpu::Buffer {
        ctxt.create_buffer_simple(
            Some(label),
            size,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
    }

    /// Size of one entry once padded to `alignment`.
    #[inline]
    pub fn aligned_entry_size(alignment: u64) -> u64 {
        (mem::size_of::<T>() as u64).div_ceil(alignment) * alignment
    }

    /// Size of the window the shader sees at each offset.
    #[inline]
    pub fn binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(mem::size_of::<T>() as u64)
    }

    /// Number of staged entries.
    #[inline]
    pub fn len(&self) -> usize {
        (self.staged.len() as u64 / self.stride) as usize
    }

    /// Whether nothing is staged.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Forgets the staged entries.
    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Stages `value` and returns its dynamic offset.
    pub fn push(&mut self, value: &T) -> u32 {
        let offset = self.staged.len() as u32;
        self.staged.extend_from_slice(bytemuck::bytes_of(value));
        self.staged.resize(offset as usize + self.stride as usize, 0);
        offset
    }

    /// Writes the staged entries to the GPU.
    ///
    /// Returns `true` if the buffer had to be recreated, in which case the bind
    /// groups referencing it are stale.
    pub fn flush(&mut self, ctxt: &Context) -> bool {
        if self.staged.is_empty() {
            return false;
        }

        let needed = self.staged.len() as u64;
        let grown = needed > self.buffer.size();
        if grown {
            let size = needed.next_power_of_two().max(self.buffer.size() * 2);
            log::trace!("growing {} to {size} bytes", self.label);
            self.buffer = Self::create(ctxt, self.label, size);
        }

        ctxt.write_buffer(&self.buffer, 0, &self.staged);
        grown
    }

    /// The GPU buffer.
    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
