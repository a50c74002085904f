use crate::camera::Camera3d;
use glamx::{Mat4, Pose3, Vec3};

/// Snapshot of a camera, as copied from the live scene onto the offscreen renderer.
#[derive(Copy, Clone, Debug)]
pub struct CameraState {
    /// World-space pose of the eye.
    pub eye_pose: Pose3,
    /// World to view transform.
    pub view: Mat4,
    /// View to clip transform.
    pub projection: Mat4,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState::from_pose(Pose3::IDENTITY, &Camera3d::default())
    }
}

impl CameraState {
    /// Snapshot of `camera` seen from a node at `eye_pose`.
    pub fn from_pose(eye_pose: Pose3, camera: &Camera3d) -> Self {
        CameraState {
            eye_pose,
            view: eye_pose.inverse().to_mat4(),
            projection: camera.projection(),
        }
    }

    /// Combined world to clip transform.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space eye position.
    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye_pose.translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_is_inverse_of_eye_pose() {
        let mut pose = Pose3::IDENTITY;
        pose.translation = Vec3::new(0.0, 1.0, 5.0);
        let state = CameraState::from_pose(pose, &Camera3d::default());

        let origin_in_view = state.view.transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, -1.0, -5.0)).length() < 1.0e-5);
        assert_eq!(state.eye(), Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn test_point_in_front_projects_inside_depth_range() {
        let state = CameraState::default();
        let clip = state
            .view_projection()
            .project_point3(Vec3::new(0.0, 0.0, -10.0));
        assert!(clip.z > 0.0 && clip.z < 1.0);
        assert!(clip.x.abs() < 1.0e-5 && clip.y.abs() < 1.0e-5);
    }
}
