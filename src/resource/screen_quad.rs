use crate::context::Context;
use crate::procedural::{QuadVertex, SCREEN_QUAD_VERTEX_COUNT, SCREEN_QUAD_VERTICES};
use crate::resource::gpu_vector::{BufferType, GPUVec};

/// The full-screen quad, uploaded once and never modified.
pub struct ScreenQuad {
    vertices: GPUVec<QuadVertex>,
}

impl ScreenQuad {
    /// Uploads the quad vertices.
    pub fn new(ctxt: &Context) -> Self {
        let mut vertices = GPUVec::new(
            SCREEN_QUAD_VERTICES.to_vec(),
            BufferType::Array,
            "screen_quad_vertices",
        );
        vertices.upload_and_release(ctxt);

        ScreenQuad { vertices }
    }

    /// The vertex buffer.
    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertices.buffer()
    }

    /// Number of vertices to draw.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        SCREEN_QUAD_VERTEX_COUNT
    }

    /// Layout of [`QuadVertex`]: position at location 0, uv at location 1.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
