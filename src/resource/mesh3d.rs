//! Data structure of a scene node geometry.

use crate::context::Context;
use crate::procedural::{self, RenderMesh};
use crate::resource::gpu_vector::{BufferType, GPUVec};
use glamx::Vec3;

/// A 3D mesh whose vertex data is lazily uploaded to the GPU.
///
/// Positions and normals live in separate vertex buffers so the extrusion
/// program can read the normal of every vertex.
pub struct GpuMesh3d {
    coords: GPUVec<Vec3>,
    normals: GPUVec<Vec3>,
    faces: GPUVec<[u32; 3]>,
}

/// GPU buffers of a mesh, ready to be bound.
#[derive(Clone, Debug)]
pub struct MeshBuffers {
    /// Vertex positions at slot 0.
    pub coords: wgpu::Buffer,
    /// Vertex normals at slot 1.
    pub normals: wgpu::Buffer,
    /// `u32` triangle indices.
    pub faces: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl GpuMesh3d {
    /// Creates a new mesh. Normals are computed from the faces if not provided.
    pub fn new(coords: Vec<Vec3>, faces: Vec<[u32; 3]>, normals: Option<Vec<Vec3>>) -> GpuMesh3d {
        let normals = normals.unwrap_or_else(|| procedural::compute_normals(&coords, &faces));

        GpuMesh3d {
            coords: GPUVec::new(coords, BufferType::Array, "mesh_coords"),
            normals: GPUVec::new(normals, BufferType::Array, "mesh_normals"),
            faces: GPUVec::new(faces, BufferType::ElementArray, "mesh_faces"),
        }
    }

    /// Creates a mesh from a procedural mesh descriptor.
    pub fn from_render_mesh(mesh: RenderMesh) -> GpuMesh3d {
        let mut mesh = mesh;
        let faces = mesh.unified_triangles().to_vec();
        let RenderMesh {
            coords, normals, ..
        } = mesh;

        GpuMesh3d::new(coords, faces, normals)
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.faces.len()
    }

    /// The vertex positions, if still on RAM.
    #[inline]
    pub fn coords(&self) -> Option<&[Vec3]> {
        self.coords.data()
    }

    /// The vertex normals, if still on RAM.
    #[inline]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.data()
    }

    /// Uploads what is out of date and returns the buffers to bind.
    ///
    /// Returns `None` for an empty mesh.
    pub fn ensure_on_gpu(&mut self, ctxt: &Context) -> Option<MeshBuffers> {
        let coords = self.coords.ensure_on_gpu(ctxt)?.clone();
        let normals = self.normals.ensure_on_gpu(ctxt)?.clone();
        let index_count = self.faces.len() as u32 * 3;
        let faces = self.faces.ensure_on_gpu(ctxt)?.clone();

        Some(MeshBuffers {
            coords,
            normals,
            faces,
            index_count,
        })
    }

    /// Vertex buffer layouts matching [`MeshBuffers`], positions then normals.
    pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        const NORMAL: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

        [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &NORMAL,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_render_mesh_keeps_flat_normals() {
        let mesh = GpuMesh3d::from_render_mesh(procedural::unit_cuboid());
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.coords().map(|c| c.len()), Some(24));
        assert!(mesh
            .normals()
            .unwrap_or_default()
            .iter()
            .all(|n| (n.length() - 1.0).abs() < 1.0e-5));
    }
}
