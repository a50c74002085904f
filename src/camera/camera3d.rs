use glamx::Mat4;
use std::f32;

/// A perspective camera component.
///
/// The camera itself has no pose: it views the scene from the world pose of the
/// scene node carrying it, looking down that node's `-Z` axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera3d {
    proj: Mat4,
}

impl Default for Camera3d {
    fn default() -> Self {
        Camera3d::new(f32::consts::PI / 4.0, 4.0 / 3.0, 0.01, 1024.0)
    }
}

impl Camera3d {
    /// Creates a perspective camera.
    ///
    /// # Arguments
    /// * `fov` - Vertical field of view in radians
    /// * `aspect` - Width over height of the viewport
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Camera3d {
        Camera3d::from_projection(Mat4::perspective_rh(fov, aspect, znear, zfar))
    }

    /// A camera using the projection handed out by a tracker as-is.
    pub fn from_projection(proj: Mat4) -> Camera3d {
        Camera3d { proj }
    }

    /// The projection matrix, mapping depth to wgpu's `[0, 1]` range.
    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.proj
    }
}
