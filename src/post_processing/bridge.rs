//! Synchronization of the offscreen scene with the host's live scene.
//!
//! Every offscreen pass starts with an update tick. The tick copies the live
//! camera, attaches placed content once, moves the outlined object to the
//! anchor, and applies the per-pass state table to the target nodes.

use crate::builtin::MaterialBank;
use crate::camera::CameraState;
use crate::error::{FrameMiss, NodeRole};
use crate::post_processing::{
    HostScene, MaterialSelection, OutlineConfig, Pass, PassState, Variant,
};
use crate::resource::MaterialRef;
use crate::scene::SceneNode3d;

/// The per-tick synchronization callback, called once before every offscreen pass.
pub trait SceneUpdateHook {
    /// Synchronizes the scene for `pass` and applies its state.
    ///
    /// On a miss nothing has been modified for this pass.
    fn update(
        &mut self,
        pass: Pass,
        host: &dyn HostScene,
        time: f32,
    ) -> Result<SyncedScene, FrameMiss>;

    /// Called when the tracking system reports a placement for the target object.
    fn object_placed(&mut self, node: &SceneNode3d);
}

/// Handles to the nodes an outline frame modifies.
#[derive(Clone)]
pub struct TargetHandles {
    /// The outlined mesh.
    pub mesh: SceneNode3d,
    /// The node moved to the anchor: the placed clone in the anchored variant,
    /// the mesh's parent in the direct one.
    pub container: SceneNode3d,
    /// The shadow-catcher plane.
    pub shadow_plane: SceneNode3d,
    /// The directional light of the placed content. Always present in the anchored variant.
    pub light: Option<SceneNode3d>,
}

/// A scene ready to be rendered for one pass.
#[derive(Clone)]
pub struct SyncedScene {
    /// Root to render.
    pub root: SceneNode3d,
    /// Viewpoint.
    pub camera: CameraState,
    /// The state that was applied.
    pub state: PassState,
    /// The pass the state was applied for.
    pub pass: Pass,
    /// The nodes the state was applied to.
    pub targets: TargetHandles,
}

/// The target object's own materials, captured once per session.
#[derive(Clone, Debug, Default)]
pub struct OriginalMaterials {
    captured: Option<Vec<MaterialRef>>,
}

impl OriginalMaterials {
    /// Records the materials of `mesh` unless something was already captured.
    pub fn capture_once(&mut self, mesh: &SceneNode3d) -> &[MaterialRef] {
        if self.captured.is_none() {
            log::trace!("capturing the original materials of {:?}", mesh.name());
        }
        self.captured
            .get_or_insert_with(|| mesh.materials().unwrap_or_default())
    }

    /// The captured materials, if any.
    #[inline]
    pub fn get(&self) -> Option<&[MaterialRef]> {
        self.captured.as_deref()
    }
}

/// The [`SceneUpdateHook`] of the outline effect.
pub struct SceneBridge {
    config: OutlineConfig,
    bank: MaterialBank,
    offscreen_root: SceneNode3d,
    pending: Option<SceneNode3d>,
    attached: Option<SceneNode3d>,
    handles: Option<(SceneNode3d, TargetHandles)>,
    originals: OriginalMaterials,
    camera: CameraState,
    occluder: SceneNode3d,
}

impl SceneBridge {
    /// A bridge with an empty offscreen scene.
    pub fn new(config: OutlineConfig) -> Self {
        let bank = MaterialBank::new(&config);
        let extent = config.occluder_extent;
        let occluder = SceneNode3d::cube(extent, extent, extent, bank.occluder_material())
            .set_name("OutlineOccluder")
            .set_casts_shadow(false);

        SceneBridge {
            config,
            bank,
            offscreen_root: SceneNode3d::empty().set_name("OffscreenRoot"),
            pending: None,
            attached: None,
            handles: None,
            originals: OriginalMaterials::default(),
            camera: CameraState::default(),
            occluder,
        }
    }

    /// Root of the offscreen scene of the anchored variant.
    #[inline]
    pub fn offscreen_root(&self) -> &SceneNode3d {
        &self.offscreen_root
    }

    /// The override materials.
    #[inline]
    pub fn materials(&self) -> &MaterialBank {
        &self.bank
    }

    /// The materials captured on the first full render.
    #[inline]
    pub fn originals(&self) -> &OriginalMaterials {
        &self.originals
    }

    /// The placed clone waiting to be attached.
    #[inline]
    pub fn pending(&self) -> Option<&SceneNode3d> {
        self.pending.as_ref()
    }

    /// The cube surrounding the viewpoint during the direct variant's extrusion pass.
    #[inline]
    pub fn occluder(&self) -> &SceneNode3d {
        &self.occluder
    }

    /// The last viewpoint copied from the live scene.
    #[inline]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    fn attach_pending(&mut self) {
        if self.attached.is_some() {
            return;
        }

        if let Some(node) = self.pending.take() {
            log::trace!("attaching {:?} to the offscreen scene", node.name());
            self.offscreen_root.add_child(node.clone());
            self.attached = Some(node);
        }
    }

    fn scene_root(&self, host: &dyn HostScene) -> Result<SceneNode3d, FrameMiss> {
        match self.config.variant {
            Variant::Anchored if self.attached.is_some() => Ok(self.offscreen_root.clone()),
            Variant::Anchored => Err(FrameMiss::AnchorUnavailable),
            Variant::Direct => Ok(host.root()),
        }
    }

    fn resolve(&self, root: &SceneNode3d) -> Result<TargetHandles, FrameMiss> {
        let config = &self.config;

        let mesh = config
            .mesh_names
            .iter()
            .find_map(|name| root.find_by_name(name))
            .ok_or(FrameMiss::TargetNotFound(NodeRole::Mesh))?;

        let container = match config.variant {
            Variant::Anchored => self
                .attached
                .clone()
                .filter(|c| mesh.is_descendant_of(c))
                .ok_or(FrameMiss::TargetNotFound(NodeRole::Container))?,
            Variant::Direct => mesh.parent().unwrap_or_else(|| mesh.clone()),
        };

        let shadow_plane = root
            .find_by_name(&config.shadow_plane_name)
            .ok_or(FrameMiss::TargetNotFound(NodeRole::ShadowPlane))?;

        let light = root.find_first(&mut |d| d.name() == config.light_name && d.light().is_some());
        if light.is_none() && config.variant == Variant::Anchored {
            return Err(FrameMiss::TargetNotFound(NodeRole::Light));
        }

        Ok(TargetHandles {
            mesh,
            container,
            shadow_plane,
            light,
        })
    }

    fn targets(&mut self, root: &SceneNode3d) -> Result<TargetHandles, FrameMiss> {
        if let Some((resolved_in, handles)) = &self.handles {
            if resolved_in.ptr_eq(root) && handles.mesh.is_descendant_of(root) {
                return Ok(handles.clone());
            }
            log::warn!("scene root or target changed, resolving target nodes again");
        }

        let handles = self.resolve(root)?;
        self.handles = Some((root.clone(), handles.clone()));
        Ok(handles)
    }

    fn live_camera_node(host: &dyn HostScene) -> Option<SceneNode3d> {
        host.root().find_first(&mut |d| d.camera().is_some())
    }

    fn apply(&mut self, state: &PassState, targets: &mut TargetHandles) {
        let _ = targets
            .mesh
            .set_visible(state.object_visible)
            .set_casts_shadow(state.object_casts_shadow);
        let _ = targets.shadow_plane.set_visible(state.shadow_plane_visible);

        if let Some(light) = targets.light.as_mut() {
            light.modify_light(|l| {
                l.shadow_mode = state.light.shadow_mode;
                l.casts_shadow = state.light.casts_shadow;
            });
        }

        let materials = match state.materials {
            MaterialSelection::Original => self.originals.get().unwrap_or_default().to_vec(),
            MaterialSelection::Extrusion => vec![self.bank.extrusion_material()],
            MaterialSelection::Mask => vec![self.bank.mask_material()],
        };
        let _ = targets.mesh.set_materials(materials);
    }

    fn place_occluder(&mut self, viewpoint: Option<SceneNode3d>) {
        let parent = self.occluder.parent();

        let in_place = match (&parent, &viewpoint) {
            (Some(p), Some(v)) => p.ptr_eq(v),
            (None, None) => true,
            _ => false,
        };
        if in_place {
            return;
        }

        if parent.is_some() {
            self.occluder.detach();
        }
        if let Some(mut viewpoint) = viewpoint {
            viewpoint.add_child(self.occluder.clone());
        }
    }
}

impl SceneUpdateHook for SceneBridge {
    fn update(
        &mut self,
        pass: Pass,
        host: &dyn HostScene,
        time: f32,
    ) -> Result<SyncedScene, FrameMiss> {
        log::trace!("bridge update: {pass} pass at t = {time}");

        if self.config.variant == Variant::Anchored {
            self.attach_pending();
        }

        let root = self.scene_root(host)?;
        let anchor = match self.config.variant {
            Variant::Anchored => Some(host.anchor_pose().ok_or(FrameMiss::AnchorUnavailable)?),
            Variant::Direct => None,
        };
        let mut targets = self.targets(&root)?;

        let camera_node = Self::live_camera_node(host);
        if let Some(node) = &camera_node {
            if let Some(camera) = node.camera() {
                self.camera = CameraState::from_pose(node.world_pose(), &camera);
            }
        }

        if let Some(anchor) = anchor {
            let _ = targets.container.set_pose(anchor);
        }

        let _ = self.originals.capture_once(&targets.mesh);
        let state = PassState::for_pass(pass);
        self.apply(&state, &mut targets);

        if self.config.variant == Variant::Direct {
            self.place_occluder(camera_node.filter(|_| state.occluder));
        }

        Ok(SyncedScene {
            root,
            camera: self.camera,
            state,
            pass,
            targets,
        })
    }

    fn object_placed(&mut self, node: &SceneNode3d) {
        if self.config.variant == Variant::Direct {
            log::warn!("placement ignored: the direct variant outlines the live scene");
            return;
        }

        if self.attached.is_some() {
            log::warn!("placement ignored: placed content is already attached");
            return;
        }

        let clone = node
            .clone_tree()
            .set_name(&self.config.placed_container_name);
        if self.pending.replace(clone).is_some() {
            log::warn!("pending placement replaced before it was attached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera3d;
    use crate::color;
    use crate::light::{Light, ShadowMode};
    use crate::post_processing::StaticHost;
    use crate::resource::Material3d;
    use glamx::{Pose3, Vec3};
    use std::rc::Rc;

    fn placed_content() -> SceneNode3d {
        let mut content = SceneNode3d::empty().set_name("ShipScene");
        content
            .add_cube(1.0, 1.0, 1.0, Material3d::lit("hull", color::LIGHT_GRAY).into_ref())
            .set_name("ShipMesh");
        content
            .add_cube(4.0, 0.01, 4.0, Material3d::shadow_catcher("catcher").into_ref())
            .set_name("ShadowPlane");
        content
            .add_light(Light::directional(Vec3::NEG_Y))
            .set_name("DirectionalLight");
        content
    }

    fn live_host() -> StaticHost {
        let mut root = SceneNode3d::empty();
        root.add_camera(Camera3d::default())
            .set_position(Vec3::new(0.0, 1.0, 5.0));
        let mut anchor = Pose3::IDENTITY;
        anchor.translation = Vec3::new(0.0, 0.0, -2.0);
        StaticHost::new(root).with_anchor(anchor)
    }

    #[test]
    fn test_anchor_missing_before_placement() {
        let mut bridge = SceneBridge::new(OutlineConfig::default());
        let host = live_host();
        assert_eq!(
            bridge.update(Pass::FullRender, &host, 0.0).err(),
            Some(FrameMiss::AnchorUnavailable)
        );
    }

    #[test]
    fn test_placement_is_cloned_and_renamed() {
        let mut bridge = SceneBridge::new(OutlineConfig::default());
        let content = placed_content();
        bridge.object_placed(&content);

        let pending = bridge.pending().unwrap();
        assert!(!pending.ptr_eq(&content));
        assert_eq!(pending.name(), "NodeContainerParent");
        assert_eq!(content.name(), "ShipScene");
    }

    #[test]
    fn test_container_follows_anchor() {
        let mut bridge = SceneBridge::new(OutlineConfig::default());
        bridge.object_placed(&placed_content());
        let host = live_host();

        let synced = bridge.update(Pass::FullRender, &host, 0.0).unwrap();
        assert_eq!(
            synced.targets.container.world_pose().translation,
            Vec3::new(0.0, 0.0, -2.0)
        );
        assert_eq!(synced.camera.eye(), Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn test_light_swaps_shadow_mode() {
        let mut bridge = SceneBridge::new(OutlineConfig::default());
        bridge.object_placed(&placed_content());
        let host = live_host();

        let synced = bridge.update(Pass::OutlineMask, &host, 0.0).unwrap();
        let light = synced.targets.light.unwrap().light().unwrap();
        assert_eq!(light.shadow_mode, ShadowMode::Forward);
        assert!(!light.casts_shadow);
        assert!(!synced.targets.mesh.casts_shadow());

        let synced = bridge.update(Pass::FullRender, &host, 0.0).unwrap();
        let light = synced.targets.light.unwrap().light().unwrap();
        assert_eq!(light.shadow_mode, ShadowMode::Deferred);
        assert!(light.casts_shadow);
        assert!(synced.targets.mesh.casts_shadow());
    }

    #[test]
    fn test_overrides_do_not_leak_into_live_content() {
        let mut bridge = SceneBridge::new(OutlineConfig::default());
        let content = placed_content();
        let live_mesh = content.find_by_name("ShipMesh").unwrap();
        let live_materials = live_mesh.materials().unwrap();
        bridge.object_placed(&content);
        let host = live_host();

        let _ = bridge.update(Pass::FullRender, &host, 0.0).unwrap();
        let synced = bridge.update(Pass::OutlineExtrusion, &host, 0.0).unwrap();
        assert!(Rc::ptr_eq(
            &synced.targets.mesh.materials().unwrap()[0],
            &bridge.materials().extrusion_material()
        ));
        assert!(Rc::ptr_eq(&live_mesh.materials().unwrap()[0], &live_materials[0]));
    }

    #[test]
    fn test_missing_shadow_plane_is_a_miss() {
        let config = OutlineConfig::default().with_variant(Variant::Direct);
        let mut bridge = SceneBridge::new(config);
        let mut host = live_host();
        host.root
            .add_cube(1.0, 1.0, 1.0, Material3d::lit("hull", color::WHITE).into_ref())
            .set_name("NodeMesh");

        assert_eq!(
            bridge.update(Pass::FullRender, &host, 0.0).err(),
            Some(FrameMiss::TargetNotFound(NodeRole::ShadowPlane))
        );
        assert!(bridge.originals().get().is_none());
    }

    #[test]
    fn test_direct_placement_is_ignored() {
        let config = OutlineConfig::default().with_variant(Variant::Direct);
        let mut bridge = SceneBridge::new(config);
        bridge.object_placed(&placed_content());
        assert!(bridge.pending().is_none());
    }

    #[test]
    fn test_configured_mesh_name_selects_the_target() {
        let config = OutlineConfig::default().with_mesh_names(["Hull"]);
        let mut bridge = SceneBridge::new(config);
        let mut content = placed_content();
        content
            .add_cube(0.5, 0.5, 0.5, Material3d::lit("hull", color::WHITE).into_ref())
            .set_name("Hull");
        bridge.object_placed(&content);
        let host = live_host();

        let synced = bridge.update(Pass::FullRender, &host, 0.0).unwrap();
        assert_eq!(synced.targets.mesh.name(), "Hull");
    }

    #[test]
    fn test_unlisted_mesh_is_not_a_target() {
        let config = OutlineConfig::default().with_mesh_names(["Hull"]);
        let mut bridge = SceneBridge::new(config);
        bridge.object_placed(&placed_content());
        let host = live_host();

        assert_eq!(
            bridge.update(Pass::FullRender, &host, 0.0).err(),
            Some(FrameMiss::TargetNotFound(NodeRole::Mesh))
        );
    }

    #[test]
    fn test_occluder_has_the_configured_extent() {
        let bridge = SceneBridge::new(OutlineConfig::default().with_occluder_extent(20.0));
        let occluder = bridge.occluder();
        let data = occluder.data();
        let mesh = data.object().unwrap().mesh().borrow();
        let coords = mesh.coords().unwrap();

        let max_x = coords.iter().map(|c| c.x.abs()).fold(0.0, f32::max);
        assert_eq!(max_x, 10.0);
        assert!(!occluder.casts_shadow());
    }
}
