//! Vertex and index data uploaded to the GPU on first use.

use crate::context::Context;
use bytemuck::Pod;

/// Geometry data kept on RAM until it is first needed by a draw.
///
/// Geometry never changes once built, so the buffer is created once. The RAM
/// copy can be released after the upload.
pub struct GPUVec<T: Pod> {
    ram: Option<Vec<T>>,
    len: usize,
    buffer: Option<wgpu::Buffer>,
    kind: BufferType,
    label: &'static str,
}

impl<T: Pod> GPUVec<T> {
    /// Wraps `data`, to be uploaded as a `kind` buffer labeled `label`.
    pub fn new(data: Vec<T>, kind: BufferType, label: &'static str) -> GPUVec<T> {
        GPUVec {
            len: data.len(),
            ram: Some(data),
            buffer: None,
            kind,
            label,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The elements, unless they were released from RAM.
    #[inline]
    pub fn data(&self) -> Option<&[T]> {
        self.ram.as_deref()
    }

    /// The GPU buffer, if uploaded.
    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Uploads the data if that has not been done yet, and returns the buffer.
    ///
    /// An empty vector has no buffer.
    pub fn ensure_on_gpu(&mut self, ctxt: &Context) -> Option<&wgpu::Buffer> {
        if self.buffer.is_none() {
            let data = self.ram.as_deref().filter(|d| !d.is_empty())?;
            self.buffer = Some(ctxt.create_buffer_init(
                Some(self.label),
                bytemuck::cast_slice(data),
                self.kind.to_wgpu(),
            ));
        }

        self.buffer.as_ref()
    }

    /// Uploads the data and drops the RAM copy.
    pub fn upload_and_release(&mut self, ctxt: &Context) {
        let _ = self.ensure_on_gpu(ctxt);
        self.ram = None;
    }
}

/// Type of gpu buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferType {
    /// Vertex data.
    Array,
    /// `u32` index data.
    ElementArray,
}

impl BufferType {
    /// Buffer usages of this type.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferType::Array => wgpu::BufferUsages::VERTEX,
            BufferType::ElementArray => wgpu::BufferUsages::INDEX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_stays_on_ram_until_drawn() {
        let v = GPUVec::new(vec![[0u32, 1, 2], [2, 1, 3]], BufferType::ElementArray, "faces");
        assert_eq!(v.len(), 2);
        assert!(v.buffer().is_none());
        assert_eq!(v.data().map(|d| d[1]), Some([2, 1, 3]));
        assert_eq!(BufferType::ElementArray.to_wgpu(), wgpu::BufferUsages::INDEX);
    }
}
