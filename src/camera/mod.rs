//! Camera component and camera snapshots.

pub use self::camera3d::Camera3d;
pub use self::camera_state::CameraState;

mod camera3d;
mod camera_state;
