use super::{IndexBuffer, RenderMesh};
use glamx::{Vec2, Vec3};

/// Generates a cuboid (box) mesh with the specified extents.
///
/// The box is centered at the origin and has one flat normal per face.
///
/// # Arguments
/// * `extents` - The full dimensions of the cuboid along each axis (width, height, depth)
pub fn cuboid(extents: Vec3) -> RenderMesh {
    let mut cuboid = unit_cuboid();
    cuboid.scale_by(extents);

    cuboid
}

/// Generates a unit cuboid mesh, with half-extents of 0.5.
pub fn unit_cuboid() -> RenderMesh {
    let coords = vec![
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(0.5, 0.5, 0.5),
    ];

    let uvs = vec![
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
    ];

    let normals = vec![
        Vec3::NEG_X,
        Vec3::NEG_Z,
        Vec3::X,
        Vec3::Z,
        Vec3::NEG_Y,
        Vec3::Y,
    ];

    // [vertex, normal, uv] per corner, counter-clockwise seen from outside.
    let faces = vec![
        [[4, 0, 0], [5, 0, 1], [0, 0, 2]],
        [[5, 0, 1], [1, 0, 3], [0, 0, 2]],
        [[5, 1, 0], [6, 1, 1], [1, 1, 2]],
        [[6, 1, 1], [2, 1, 3], [1, 1, 2]],
        [[6, 2, 1], [7, 2, 0], [3, 2, 2]],
        [[2, 2, 3], [6, 2, 1], [3, 2, 2]],
        [[7, 3, 1], [4, 3, 0], [0, 3, 2]],
        [[3, 3, 3], [7, 3, 1], [0, 3, 2]],
        [[0, 4, 2], [1, 4, 0], [2, 4, 1]],
        [[3, 4, 3], [0, 4, 2], [2, 4, 1]],
        [[7, 5, 3], [6, 5, 1], [5, 5, 0]],
        [[4, 5, 2], [7, 5, 3], [5, 5, 0]],
    ];

    RenderMesh::new(
        coords,
        Some(normals),
        Some(uvs),
        Some(IndexBuffer::Split(faces)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cuboid_unifies_to_flat_faces() {
        let mut mesh = unit_cuboid();
        assert_eq!(mesh.num_triangles(), 12);

        mesh.unify_index_buffer();
        // 6 faces x 4 corners, none shared across faces.
        assert_eq!(mesh.coords.len(), 24);
    }

    #[test]
    fn test_faces_wind_outward() {
        let mut mesh = cuboid(Vec3::new(2.0, 3.0, 4.0));
        let triangles = mesh.unified_triangles().to_vec();
        let normals = mesh.normals.clone().unwrap_or_default();

        for t in triangles {
            let [a, b, c] = t.map(|i| mesh.coords[i as usize]);
            let geometric = (b - a).cross(c - a).normalize();
            assert!(geometric.dot(normals[t[0] as usize]) > 0.99);
        }
    }
}
