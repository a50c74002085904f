use glamx::{Vec2, Vec3};
use std::collections::HashMap;

/// Different representations of the index buffer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexBuffer {
    /// The vertex, normal, and uvs share the same indices.
    Unified(Vec<[u32; 3]>),
    /// The vertex, normal, and uvs have different indices.
    /// Each element is [[vertex_idx, normal_idx, uv_idx]; 3] for the 3 corners.
    Split(Vec<[[u32; 3]; 3]>),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Geometric description of a mesh, on the CPU.
pub struct RenderMesh {
    /// Coordinates of the mesh vertices.
    pub coords: Vec<Vec3>,
    /// Coordinates of the mesh normals.
    pub normals: Option<Vec<Vec3>>,
    /// Textures coordinates of the mesh.
    pub uvs: Option<Vec<Vec2>>,
    /// Index buffer of the mesh.
    pub indices: IndexBuffer,
}

impl RenderMesh {
    /// Creates a new mesh.
    ///
    /// If no `indices` is provided, trivial, sequential indices are generated.
    pub fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        indices: Option<IndexBuffer>,
    ) -> RenderMesh {
        let indices = indices.unwrap_or_else(|| {
            IndexBuffer::Unified(
                (0..coords.len() as u32 / 3)
                    .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                    .collect(),
            )
        });

        RenderMesh {
            coords,
            normals,
            uvs,
            indices,
        }
    }

    /// The number of triangles on this mesh.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        match self.indices {
            IndexBuffer::Unified(ref idx) => idx.len(),
            IndexBuffer::Split(ref idx) => idx.len(),
        }
    }

    /// Scales each vertex of this mesh.
    ///
    /// Normals are scaled by the inverse factors and renormalized.
    pub fn scale_by(&mut self, s: Vec3) {
        for c in self.coords.iter_mut() {
            *c *= s;
        }

        if let Some(ref mut normals) = self.normals {
            let inv_scale = Vec3::new(1.0 / s.x, 1.0 / s.y, 1.0 / s.z);
            for n in normals.iter_mut() {
                *n = (*n * inv_scale).normalize();
            }
        }
    }

    /// Forces the mesh to use the same index for vertices, normals and uvs.
    ///
    /// Corners sharing a position but not a normal (the edges of a cuboid) are
    /// duplicated.
    pub fn unify_index_buffer(&mut self) {
        let IndexBuffer::Split(ref ids) = self.indices else {
            return;
        };

        let mut corner_ids: HashMap<[u32; 3], u32> = HashMap::default();
        let mut coords = Vec::new();
        let mut normals = self.normals.as_ref().map(|_| Vec::new());
        let mut uvs = self.uvs.as_ref().map(|_| Vec::new());
        let mut triangles = Vec::with_capacity(ids.len());

        for triangle in ids.iter() {
            let mut unified = [0u32; 3];

            for (k, corner) in triangle.iter().enumerate() {
                unified[k] = *corner_ids.entry(*corner).or_insert_with(|| {
                    let id = coords.len() as u32;
                    coords.push(self.coords[corner[0] as usize]);

                    if let (Some(out), Some(src)) = (normals.as_mut(), self.normals.as_ref()) {
                        out.push(src[corner[1] as usize]);
                    }
                    if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                        out.push(src[corner[2] as usize]);
                    }

                    id
                });
            }

            triangles.push(unified);
        }

        self.coords = coords;
        self.normals = normals;
        self.uvs = uvs;
        self.indices = IndexBuffer::Unified(triangles);
    }

    /// Unifies the index buffer and returns the triangles.
    pub fn unified_triangles(&mut self) -> &[[u32; 3]] {
        self.unify_index_buffer();

        match self.indices {
            IndexBuffer::Unified(ref idx) => idx,
            IndexBuffer::Split(_) => &[],
        }
    }
}

/// Computes smooth vertex normals by averaging the normals of neighboring faces.
pub fn compute_normals(coordinates: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; coordinates.len()];

    for f in faces {
        let a = coordinates[f[0] as usize];
        let b = coordinates[f[1] as usize];
        let c = coordinates[f[2] as usize];
        let n = (b - a).cross(c - a);

        for &i in f.iter() {
            normals[i as usize] += n;
        }
    }

    for n in normals.iter_mut() {
        *n = n.normalize_or_zero();
    }

    normals
}
