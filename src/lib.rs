/*!
# xray3d

Selective X-ray outline of one tracked 3D object, rendered with wgpu.

The outline is produced by rendering the same scene graph several times into
offscreen targets, each time under a different material override, and then
compositing the three images with a dedicated full-screen pass:

* **Full**: the scene as the user sees it.
* **Extrusion**: the target object pushed outward along its normals, flat blue.
* **Mask**: the target object as-is, flat red.

The composite draws the outline color wherever the extrusion covers a pixel the
mask does not, and the full image everywhere else.

The host rendering system drives everything through [`FrameRenderer`]:

```no_run
use xray3d::prelude::*;

# fn host_frame(
#     effect: &mut OutlineEffect<WgpuBackend>,
#     frame: PostProcessingContext<'_>,
#     host: &dyn HostScene,
# ) {
match effect.on_frame_render(Some(frame), host, 0.016) {
    FrameOutcome::Composited => {}
    FrameOutcome::Skipped(miss) => log::debug!("no outline this frame: {miss}"),
}
# }
```

The effect owns a [`SceneBridge`] that keeps the offscreen scene in sync with
the host's live scene (camera, anchor, placed content) and applies the
per-pass material and visibility state.

[`FrameRenderer`]: crate::post_processing::FrameRenderer
[`SceneBridge`]: crate::post_processing::SceneBridge
*/

#![allow(clippy::too_many_arguments)]
#![warn(missing_docs)]

#[cfg(feature = "serde")]
extern crate serde;

pub use glamx;
pub use wgpu;

#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub use pollster;

pub mod builtin;
pub mod camera;
pub mod color;
pub mod context;
pub mod error;
pub mod light;
pub mod post_processing;
pub mod procedural;
pub mod renderer;
pub mod resource;
pub mod scene;

pub mod prelude {
    //! Most commonly used types.
    pub use crate::builtin::*;
    pub use crate::camera::*;
    pub use crate::color::*;
    pub use crate::context::*;
    pub use crate::error::*;
    pub use crate::light::*;
    pub use crate::post_processing::*;
    pub use crate::renderer::*;
    pub use crate::resource::*;
    pub use crate::scene::*;
    pub use glamx::{Mat3, Mat4, Pose3, Quat, Vec2, Vec3, Vec4};
    pub use std::cell::RefCell;
    pub use std::rc::Rc;
}
