//! Scene renderers drawing outside of the host's on-screen pass.

pub use self::offscreen_renderer::{planar_shadow_matrix, OffscreenRenderer};

mod offscreen_renderer;
