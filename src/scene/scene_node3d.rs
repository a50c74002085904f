use crate::camera::Camera3d;
use crate::light::Light;
use crate::procedural::{self, RenderMesh};
use crate::resource::{GpuMesh3d, MaterialRef};
use crate::scene::Object3d;
use glamx::{Mat4, Pose3, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::rc::Weak;

/// The data contained by a `SceneNode3d`.
pub struct SceneNodeData3d {
    name: String,
    local_scale: Vec3,
    local_transform: Pose3,
    world_scale: Vec3,
    world_transform: Pose3,
    visible: bool,
    casts_shadow: bool,
    up_to_date: bool,
    children: Vec<SceneNode3d>,
    object: Option<Object3d>,
    light: Option<Light>,
    camera: Option<Camera3d>,
    parent: Option<Weak<RefCell<SceneNodeData3d>>>,
}

/// A node of the scene graph.
///
/// This may represent a group of other nodes, and/or contain an object that can be rendered,
/// a light, or a camera. Cloning a `SceneNode3d` clones the handle, not the node: use
/// [`SceneNode3d::clone_tree`] for an independent copy.
#[derive(Clone)]
pub struct SceneNode3d {
    data: Rc<RefCell<SceneNodeData3d>>,
}

impl SceneNodeData3d {
    fn set_parent(&mut self, parent: Weak<RefCell<SceneNodeData3d>>) {
        self.parent = Some(parent);
    }

    fn remove_from_parent(&mut self, to_remove: &SceneNode3d) {
        if let Some(bp) = self.parent.as_ref().and_then(|p| p.upgrade()) {
            bp.borrow_mut().remove(to_remove);
        }
    }

    fn remove(&mut self, o: &SceneNode3d) {
        if let Some(i) = self
            .children
            .iter()
            .rposition(|e| Rc::ptr_eq(&o.data, &e.data))
        {
            let _ = self.children.remove(i);
        }
    }

    /// The name of this node, empty if unnamed.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this node and its children are drawn.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the object of this node projects a shadow.
    #[inline]
    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    /// The object of this node, if any.
    #[inline]
    pub fn object(&self) -> Option<&Object3d> {
        self.object.as_ref()
    }

    /// The light of this node, if any.
    #[inline]
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    /// The camera of this node, if any.
    #[inline]
    pub fn camera(&self) -> Option<&Camera3d> {
        self.camera.as_ref()
    }

    /// The children of this node.
    #[inline]
    pub fn children(&self) -> &[SceneNode3d] {
        &self.children
    }

    /// Local pose and scale as one matrix.
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        self.local_transform.to_mat4() * Mat4::from_scale(self.local_scale)
    }

    fn invalidate(&mut self) {
        self.up_to_date = false;

        for c in self.children.iter_mut() {
            let mut dm = c.data_mut();

            if dm.up_to_date {
                dm.invalidate()
            }
        }
    }

    fn update(&mut self) {
        if !self.up_to_date {
            if let Some(dp) = self.parent.as_ref().and_then(|p| p.upgrade()) {
                let mut dp = dp.borrow_mut();
                dp.update();
                self.world_transform = dp.world_transform * self.local_transform;
                self.world_scale = dp.world_scale * self.local_scale;
                self.up_to_date = true;
                return;
            }

            // no parent
            self.world_transform = self.local_transform;
            self.world_scale = self.local_scale;
            self.up_to_date = true;
        }
    }

    fn deep_copy(&self) -> SceneNode3d {
        let mut copy =
            SceneNode3d::new(self.local_scale, self.local_transform, self.object.clone());
        {
            let mut data = copy.data_mut();
            data.name = self.name.clone();
            data.visible = self.visible;
            data.casts_shadow = self.casts_shadow;
            data.light = self.light.clone();
            data.camera = self.camera;
        }

        for c in self.children.iter() {
            copy.add_child(c.data().deep_copy());
        }

        copy
    }
}

impl Default for SceneNode3d {
    fn default() -> SceneNode3d {
        SceneNode3d::empty()
    }
}

impl SceneNode3d {
    /// Creates a new unrooted scene node.
    pub fn new(local_scale: Vec3, local_transform: Pose3, object: Option<Object3d>) -> SceneNode3d {
        let data = SceneNodeData3d {
            name: String::new(),
            local_scale,
            local_transform,
            world_transform: local_transform,
            world_scale: local_scale,
            visible: true,
            casts_shadow: true,
            up_to_date: false,
            children: Vec::new(),
            object,
            light: None,
            camera: None,
            parent: None,
        };

        SceneNode3d {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Creates a new empty scene node with identity transformations.
    pub fn empty() -> SceneNode3d {
        SceneNode3d::new(Vec3::ONE, Pose3::IDENTITY, None)
    }

    /// Creates a new scene node drawing `mesh` with `material`.
    pub fn mesh(mesh: Rc<RefCell<GpuMesh3d>>, material: MaterialRef) -> SceneNode3d {
        SceneNode3d::new(Vec3::ONE, Pose3::IDENTITY, Some(Object3d::new(mesh, material)))
    }

    /// Creates a new scene node from a procedural mesh.
    pub fn render_mesh(mesh: RenderMesh, material: MaterialRef) -> SceneNode3d {
        SceneNode3d::mesh(Rc::new(RefCell::new(GpuMesh3d::from_render_mesh(mesh))), material)
    }

    /// Creates a new cube node, axis-aligned and centered at the origin.
    pub fn cube(wx: f32, wy: f32, wz: f32, material: MaterialRef) -> SceneNode3d {
        SceneNode3d::render_mesh(procedural::cuboid(Vec3::new(wx, wy, wz)), material)
    }

    /// Creates a new node holding a light.
    pub fn new_light(light: Light) -> SceneNode3d {
        let node = SceneNode3d::empty();
        node.data.borrow_mut().light = Some(light);
        node
    }

    /// Creates a new node holding a camera. The node pose is the eye pose.
    pub fn new_camera(camera: Camera3d) -> SceneNode3d {
        let node = SceneNode3d::empty();
        node.data.borrow_mut().camera = Some(camera);
        node
    }

    /// Removes this node from its parent in the scene graph.
    ///
    /// This is an alias for [`Self::remove`].
    pub fn detach(&mut self) {
        self.remove();
    }

    /// Removes this node from its parent in the scene graph.
    ///
    /// The node becomes a root and keeps its children.
    pub fn remove(&mut self) {
        let self_self = self.clone();
        let mut data = self.data_mut();
        data.remove_from_parent(&self_self);
        data.parent = None;
        data.invalidate();
    }

    /// Returns an immutable reference to this node's internal data.
    pub fn data(&self) -> Ref<'_, SceneNodeData3d> {
        self.data.borrow()
    }

    /// Returns a mutable reference to this node's internal data.
    pub fn data_mut(&mut self) -> RefMut<'_, SceneNodeData3d> {
        self.data.borrow_mut()
    }

    /// Whether both handles designate the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &SceneNode3d) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// The parent of this node, if it has one and it is still alive.
    pub fn parent(&self) -> Option<SceneNode3d> {
        self.data()
            .parent
            .as_ref()
            .and_then(|p| p.upgrade())
            .map(|data| SceneNode3d { data })
    }

    /// Whether `ancestor` is this node or one of its ancestors.
    pub fn is_descendant_of(&self, ancestor: &SceneNode3d) -> bool {
        let mut curr = Some(self.clone());

        while let Some(node) = curr {
            if node.ptr_eq(ancestor) {
                return true;
            }
            curr = node.parent();
        }

        false
    }

    /// A deep copy of the subtree rooted at this node.
    ///
    /// Nodes are duplicated. Meshes are shared and material lists are copied,
    /// so the copy can be re-materialed without touching the original.
    /// The copy has no parent.
    pub fn clone_tree(&self) -> SceneNode3d {
        self.data().deep_copy()
    }

    /*
     *
     * Methods to add objects.
     *
     */
    /// Adds an empty group node as a child of this node.
    pub fn add_group(&mut self) -> SceneNode3d {
        let node = SceneNode3d::empty();

        self.add_child(node.clone());

        node
    }

    /// Adds an existing node as a child of this node.
    ///
    /// # Panics
    /// Panics if the node already has a parent
    pub fn add_child(&mut self, node: SceneNode3d) {
        assert!(
            node.data().is_root(),
            "The added node must not have a parent yet."
        );

        let mut node = node;
        let self_weak_ptr = Rc::downgrade(&self.data);
        {
            let mut data = node.data_mut();
            data.set_parent(self_weak_ptr);
            data.invalidate();
        }
        self.data_mut().children.push(node)
    }

    /// Adds a cube as a child of this node.
    pub fn add_cube(&mut self, wx: f32, wy: f32, wz: f32, material: MaterialRef) -> SceneNode3d {
        let node = SceneNode3d::cube(wx, wy, wz, material);
        self.add_child(node.clone());
        node
    }

    /// Adds a procedural mesh as a child of this node.
    pub fn add_render_mesh(&mut self, mesh: RenderMesh, material: MaterialRef) -> SceneNode3d {
        let node = SceneNode3d::render_mesh(mesh, material);
        self.add_child(node.clone());
        node
    }

    /// Adds a light as a child of this node.
    pub fn add_light(&mut self, light: Light) -> SceneNode3d {
        let node = SceneNode3d::new_light(light);
        self.add_child(node.clone());
        node
    }

    /// Adds a camera as a child of this node.
    pub fn add_camera(&mut self, camera: Camera3d) -> SceneNode3d {
        let node = SceneNode3d::new_camera(camera);
        self.add_child(node.clone());
        node
    }

    /// Applies a closure to this node and every node below it, depth-first.
    #[inline]
    pub fn apply_to_scene_nodes_mut<F: FnMut(&mut SceneNode3d)>(&mut self, f: &mut F) {
        f(self);

        let mut children = self.data().children.clone();
        for c in children.iter_mut() {
            c.apply_to_scene_nodes_mut(f)
        }
    }

    /// Applies a closure to this node and every node below it, depth-first.
    ///
    /// The closure runs while the ancestors of the visited node are borrowed.
    #[inline]
    pub fn apply_to_scene_nodes<F: FnMut(&SceneNode3d)>(&self, f: &mut F) {
        f(self);

        for c in self.data().children.iter() {
            c.apply_to_scene_nodes(f)
        }
    }

    /// Applies a closure to each object contained by this node and its children.
    #[inline]
    pub fn apply_to_objects_mut<F: FnMut(&mut Object3d)>(&mut self, f: &mut F) {
        let mut data = self.data_mut();
        if let Some(ref mut o) = data.object {
            f(o)
        }

        for c in data.children.iter_mut() {
            c.apply_to_objects_mut(f)
        }
    }

    /// Applies a closure to each object contained by this node and its children.
    #[inline]
    pub fn apply_to_objects<F: FnMut(&Object3d)>(&self, f: &mut F) {
        let data = self.data();
        if let Some(ref o) = data.object {
            f(o)
        }

        for c in data.children.iter() {
            c.apply_to_objects(f)
        }
    }

    /// The first node, depth-first and this node included, matching `pred`.
    pub fn find_first<P: FnMut(&SceneNodeData3d) -> bool>(&self, pred: &mut P) -> Option<SceneNode3d> {
        let data = self.data();
        if pred(&data) {
            return Some(self.clone());
        }

        let found = data.children.iter().find_map(|c| c.find_first(pred));
        found
    }

    /// The first node, depth-first, with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<SceneNode3d> {
        self.find_first(&mut |d| d.name == name)
    }

    /// How many nodes of this subtree have the given name.
    pub fn count_named(&self, name: &str) -> usize {
        let mut count = 0;
        self.apply_to_scene_nodes(&mut |n| {
            if n.data().name == name {
                count += 1
            }
        });
        count
    }

    /// The name of this node.
    #[inline]
    pub fn name(&self) -> String {
        self.data().name.clone()
    }

    /// Renames this node.
    #[inline]
    pub fn set_name(&mut self, name: &str) -> Self {
        self.data_mut().name = name.to_string();
        self.clone()
    }

    /// Get the visibility status of node.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.data().visible
    }

    /// Sets the visibility of this node.
    ///
    /// The node and its children are not rendered if it is not visible.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) -> Self {
        self.data_mut().visible = visible;
        self.clone()
    }

    /// Whether the object of this node projects a shadow.
    #[inline]
    pub fn casts_shadow(&self) -> bool {
        self.data().casts_shadow
    }

    /// Sets whether the object of this node projects a shadow. Children are not affected.
    #[inline]
    pub fn set_casts_shadow(&mut self, casts_shadow: bool) -> Self {
        self.data_mut().casts_shadow = casts_shadow;
        self.clone()
    }

    /// The material list of this node's object, `None` if it has no object.
    pub fn materials(&self) -> Option<Vec<MaterialRef>> {
        self.data().object.as_ref().map(|o| o.materials().to_vec())
    }

    /// Replaces the material list of this node's object. Does nothing without an object.
    pub fn set_materials(&mut self, materials: Vec<MaterialRef>) -> Self {
        if let Some(o) = self.data_mut().object.as_mut() {
            o.set_materials(materials);
        }
        self.clone()
    }

    /// Sets the material of all objects in this node and its children.
    #[inline]
    pub fn set_material(&mut self, material: MaterialRef) -> Self {
        self.apply_to_objects_mut(&mut |o| o.set_material(material.clone()));
        self.clone()
    }

    /// The light of this node, if any.
    #[inline]
    pub fn light(&self) -> Option<Light> {
        self.data().light.clone()
    }

    /// Modifies the light of this node in place. Does nothing without a light.
    pub fn modify_light<F: FnOnce(&mut Light)>(&mut self, f: F) {
        if let Some(light) = self.data_mut().light.as_mut() {
            f(light)
        }
    }

    /// The camera of this node, if any.
    #[inline]
    pub fn camera(&self) -> Option<Camera3d> {
        self.data().camera
    }

    /// This node world transformation.
    ///
    /// This will force an update of the world transformation of its parents if they have been
    /// invalidated.
    #[inline]
    pub fn world_pose(&self) -> Pose3 {
        let mut data = self.data.borrow_mut();
        data.update();
        data.world_transform
    }

    /// Sets this node's local transformation, replacing the current one.
    #[inline]
    pub fn set_pose(&mut self, t: Pose3) -> Self {
        let mut data = self.data_mut();
        data.invalidate();
        data.local_transform = t;
        drop(data);
        self.clone()
    }

    /// Sets the local translation, keeping the rotation.
    #[inline]
    pub fn set_position(&mut self, t: Vec3) -> Self {
        let mut data = self.data_mut();
        data.invalidate();
        data.local_transform.translation = t;
        drop(data);
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RED;
    use crate::resource::Material3d;
    use glamx::Quat;

    fn red() -> MaterialRef {
        Material3d::constant("red", RED).into_ref()
    }

    #[test]
    fn test_world_pose_composes_parent_first() {
        let mut root = SceneNode3d::empty();
        root.set_pose(Pose3::from(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)));
        let mut child = root.add_group();
        child.set_position(Vec3::new(1.0, 0.0, 0.0));

        let world = child.world_pose().translation;
        assert!((world - Vec3::new(0.0, 0.0, -1.0)).length() < 1.0e-5);
    }

    #[test]
    fn test_world_pose_follows_parent_moves() {
        let mut root = SceneNode3d::empty();
        let mut child = root.add_group();
        child.set_position(Vec3::X);
        assert_eq!(child.world_pose().translation, Vec3::X);

        root.set_position(Vec3::Y);
        assert!((child.world_pose().translation - Vec3::new(1.0, 1.0, 0.0)).length() < 1.0e-6);
    }

    #[test]
    fn test_find_by_name_depth_first() {
        let mut root = SceneNode3d::empty();
        let mut a = root.add_group().set_name("a");
        a.add_group().set_name("target");
        root.add_group().set_name("target");

        let found = root.find_by_name("target").unwrap();
        assert!(found.parent().unwrap().ptr_eq(&a));
        assert_eq!(root.count_named("target"), 2);
        assert!(root.find_by_name("missing").is_none());
    }

    #[test]
    fn test_clone_tree_is_independent() {
        let mut root = SceneNode3d::empty().set_name("root");
        let mut mesh = root.add_cube(1.0, 1.0, 1.0, red()).set_name("mesh");

        let copy = root.clone_tree();
        let mut copied_mesh = copy.find_by_name("mesh").unwrap();
        assert!(!copied_mesh.ptr_eq(&mesh));
        assert!(copy.data().is_root());

        let original = mesh.materials().unwrap();
        copied_mesh.set_material(Material3d::constant("other", RED).into_ref());
        assert!(Rc::ptr_eq(&mesh.materials().unwrap()[0], &original[0]));

        let shared_mesh = |n: &SceneNode3d| n.data().object().unwrap().mesh().clone();
        assert!(Rc::ptr_eq(&shared_mesh(&mesh), &shared_mesh(&copied_mesh)));

        mesh.set_visible(false);
        assert!(copied_mesh.is_visible());
    }

    #[test]
    fn test_detach_makes_a_root() {
        let mut root = SceneNode3d::empty();
        let mut child = root.add_group();
        child.set_position(Vec3::X);
        root.set_position(Vec3::Y);
        assert!(child.is_descendant_of(&root));

        child.detach();
        assert!(child.data().is_root());
        assert!(root.data().children().is_empty());
        assert_eq!(child.world_pose().translation, Vec3::X);
        assert!(!child.is_descendant_of(&root));
    }

    #[test]
    #[should_panic]
    fn test_add_child_twice_panics() {
        let mut a = SceneNode3d::empty();
        let mut b = SceneNode3d::empty();
        let child = a.add_group();
        b.add_child(child);
    }
}
