use bytemuck::{Pod, Zeroable};

/// Vertex of the full-screen quad: clip-space position and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Clip-space position, `z` is always 0.
    pub position: [f32; 3],
    /// Texture coordinate, `v` pointing down.
    pub uv: [f32; 2],
}

impl QuadVertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        QuadVertex {
            position: [x, y, 0.0],
            uv: [u, v],
        }
    }
}

/// Number of vertices drawn by one composite.
pub const SCREEN_QUAD_VERTEX_COUNT: u32 = 6;

/// The two triangles covering the whole viewport.
pub const SCREEN_QUAD_VERTICES: [QuadVertex; SCREEN_QUAD_VERTEX_COUNT as usize] = [
    QuadVertex::new(-1.0, 1.0, 0.0, 0.0),
    QuadVertex::new(1.0, -1.0, 1.0, 1.0),
    QuadVertex::new(1.0, 1.0, 1.0, 0.0),
    QuadVertex::new(1.0, -1.0, 1.0, 1.0),
    QuadVertex::new(-1.0, 1.0, 0.0, 0.0),
    QuadVertex::new(-1.0, -1.0, 0.0, 1.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_uvs_follow_positions() {
        for v in SCREEN_QUAD_VERTICES {
            assert_eq!(v.uv[0], (v.position[0] + 1.0) * 0.5);
            assert_eq!(v.uv[1], (1.0 - v.position[1]) * 0.5);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn test_quad_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 20);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&SCREEN_QUAD_VERTICES).len(), 120);
    }
}
