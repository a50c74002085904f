//! GPU resources.

pub use crate::resource::dynamic_buffer::DynamicUniformBuffer;
pub use crate::resource::gpu_vector::{BufferType, GPUVec};
pub use crate::resource::material::{
    CullMode, Material3d, MaterialRef, PipelineKey, Shading, VertexStage,
};
pub use crate::resource::mesh3d::{GpuMesh3d, MeshBuffers};
pub use crate::resource::render_targets::{RenderTarget, RenderTargetSet, TargetDescriptor};
pub use crate::resource::screen_quad::ScreenQuad;

mod dynamic_buffer;
mod gpu_vector;
pub mod material;
mod mesh3d;
mod render_targets;
mod screen_quad;
