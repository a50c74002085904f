#![allow(dead_code)]

use xray3d::prelude::*;
use xray3d::procedural;
use xray3d::wgpu::TextureFormat;

pub const FORMAT: TextureFormat = TextureFormat::Bgra8Unorm;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn view() -> ViewDescriptor {
    ViewDescriptor::new(1024, 768, FORMAT)
}

pub fn at(translation: Vec3) -> Pose3 {
    let mut pose = Pose3::IDENTITY;
    pose.translation = translation;
    pose
}

/// A placed ship: a lit mesh on a shadow catcher, lit by a directional light.
pub fn ship(mesh_name: &str) -> SceneNode3d {
    let mut content = SceneNode3d::empty().set_name("ShipScene");
    let hull = Material3d::lit("hull", LIGHT_GRAY).into_ref();
    let trim = Material3d::lit("trim", WHITE).into_ref();
    let mut mesh = content.add_cube(1.0, 0.5, 2.0, hull);
    let mesh_materials = mesh.materials().unwrap_or_default();
    let _ = mesh
        .set_materials(mesh_materials.into_iter().chain([trim]).collect())
        .set_name(mesh_name)
        .set_position(Vec3::new(0.0, 0.25, 0.0));
    content
        .add_render_mesh(
            procedural::ground_plane(10.0, 10.0),
            Material3d::shadow_catcher("catcher").into_ref(),
        )
        .set_name("ShadowPlane");
    content
        .add_light(Light::directional(Vec3::new(0.3, -1.0, 0.2)))
        .set_name("DirectionalLight");
    content
}

/// A live scene holding only the device camera, with a tracked anchor.
pub fn ar_host() -> StaticHost {
    let mut root = SceneNode3d::empty().set_name("LiveRoot");
    root.add_camera(Camera3d::default())
        .set_name("DeviceCamera")
        .set_position(Vec3::new(0.0, 1.5, 4.0));
    StaticHost::new(root).with_anchor(at(Vec3::new(0.0, 0.0, -1.0)))
}

/// A live scene holding the camera and the ship itself.
pub fn direct_host() -> StaticHost {
    let mut host = ar_host();
    host.anchor = None;
    host.root.add_child(ship("NodeMesh"));
    host
}

pub fn anchored_effect() -> OutlineEffect<DummyBackend> {
    let mut effect = OutlineEffect::dummy(&view(), OutlineConfig::default()).unwrap();
    effect.on_object_placed(&ship("NodeMesh"));
    effect
}

pub fn direct_effect() -> OutlineEffect<DummyBackend> {
    let config = OutlineConfig::default().with_variant(Variant::Direct);
    OutlineEffect::dummy(&view(), config).unwrap()
}

pub fn offscreen_passes(events: &[BackendEvent]) -> Vec<Pass> {
    events
        .iter()
        .filter_map(|e| match e {
            BackendEvent::Offscreen { pass, .. } => Some(*pass),
            _ => None,
        })
        .collect()
}

pub fn same_materials(a: &[MaterialRef], b: &[MaterialRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Rc::ptr_eq(a, b))
}
