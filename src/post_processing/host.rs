use crate::scene::SceneNode3d;
use glamx::Pose3;

/// What the outline effect reads from the host every frame.
pub trait HostScene {
    /// Root of the live scene graph. Its first node carrying a camera is the active viewpoint.
    fn root(&self) -> SceneNode3d;

    /// World pose of the placement anchor, `None` while it is not tracked.
    fn anchor_pose(&self) -> Option<Pose3>;
}

/// A host made of a scene root and an optional fixed anchor.
///
/// Useful when the host owns no tracking system, or in tests.
#[derive(Clone, Default)]
pub struct StaticHost {
    /// Root of the live scene graph.
    pub root: SceneNode3d,
    /// Anchor pose reported every frame.
    pub anchor: Option<Pose3>,
}

impl StaticHost {
    /// A host without anchor.
    pub fn new(root: SceneNode3d) -> Self {
        StaticHost { root, anchor: None }
    }

    /// Sets the anchor reported from now on.
    pub fn with_anchor(mut self, anchor: Pose3) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

impl HostScene for StaticHost {
    fn root(&self) -> SceneNode3d {
        self.root.clone()
    }

    fn anchor_pose(&self) -> Option<Pose3> {
        self.anchor
    }
}
