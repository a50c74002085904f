//! Procedural mesh generation.

pub use self::cuboid::{cuboid, unit_cuboid};
pub use self::quad::ground_plane;
pub use self::render_mesh::{compute_normals, IndexBuffer, RenderMesh};
pub use self::screen_quad::{QuadVertex, SCREEN_QUAD_VERTEX_COUNT, SCREEN_QUAD_VERTICES};

mod cuboid;
mod quad;
mod render_mesh;
mod screen_quad;
