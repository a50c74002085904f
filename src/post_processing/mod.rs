//! The outline effect.

pub use self::backend::{
    BackendEvent, DummyBackend, DummyFrame, OutlineBackend, PostProcessingContext, WgpuBackend,
};
pub use self::bridge::{
    OriginalMaterials, SceneBridge, SceneUpdateHook, SyncedScene, TargetHandles,
};
pub use self::config::{OutlineConfig, Variant, ViewDescriptor};
pub use self::host::{HostScene, StaticHost};
pub use self::outline_composite::OutlineComposite;
pub use self::outline_effect::{FrameOutcome, FrameRenderer, OutlineEffect};
pub use self::pass::{LightMode, MaterialSelection, Pass, PassState};

pub mod backend;
mod bridge;
mod config;
mod host;
mod outline_composite;
mod outline_effect;
mod pass;
