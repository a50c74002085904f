use super::{IndexBuffer, RenderMesh};
use glamx::{Vec2, Vec3};

/// Generates a horizontal quad lying on the XZ plane, facing `+Y`.
///
/// This is the shape of a shadow-catcher plane under a placed object.
///
/// # Arguments
/// * `width` - The extent along the X axis
/// * `depth` - The extent along the Z axis
pub fn ground_plane(width: f32, depth: f32) -> RenderMesh {
    let hw = width * 0.5;
    let hd = depth * 0.5;

    let coords = vec![
        Vec3::new(-hw, 0.0, -hd),
        Vec3::new(-hw, 0.0, hd),
        Vec3::new(hw, 0.0, hd),
        Vec3::new(hw, 0.0, -hd),
    ];
    let normals = vec![Vec3::Y; 4];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
    ];

    RenderMesh::new(
        coords,
        Some(normals),
        Some(uvs),
        Some(IndexBuffer::Unified(vec![[0, 1, 2], [0, 2, 3]])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_plane_faces_up() {
        let mesh = ground_plane(2.0, 4.0);
        let IndexBuffer::Unified(ref triangles) = mesh.indices else {
            panic!("ground plane uses a unified index buffer");
        };

        for t in triangles {
            let [a, b, c] = t.map(|i| mesh.coords[i as usize]);
            assert!((b - a).cross(c - a).y > 0.0);
        }
        assert_eq!(mesh.coords[2], Vec3::new(1.0, 0.0, 2.0));
    }
}
