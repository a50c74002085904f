//! The pass orchestrator.

use crate::context::Context;
use crate::error::{FrameMiss, SetupError};
use crate::post_processing::backend::{DummyBackend, OutlineBackend, WgpuBackend};
use crate::post_processing::{
    HostScene, OutlineConfig, Pass, SceneBridge, SceneUpdateHook, Variant, ViewDescriptor,
};
use crate::scene::SceneNode3d;

/// What became of one frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The outline was composited into the host frame.
    Composited,
    /// The post-process step was skipped. The next frame tries again.
    Skipped(FrameMiss),
}

/// The host-driven entry point, called once per displayed frame.
pub trait FrameRenderer {
    /// The host frame drawn into.
    type Frame<'f>;

    /// Runs the post-process step of one frame.
    ///
    /// `frame` is `None` when the host has no open frame to composite into.
    fn on_frame_render(
        &mut self,
        frame: Option<Self::Frame<'_>>,
        host: &dyn HostScene,
        time: f32,
    ) -> FrameOutcome;
}

/// The outline effect: runs Full, Extrusion and Mask, then the composite.
pub struct OutlineEffect<B: OutlineBackend, H: SceneUpdateHook = SceneBridge> {
    backend: B,
    hook: H,
    variant: Variant,
    last_miss: Option<FrameMiss>,
}

impl OutlineEffect<WgpuBackend> {
    /// Builds the targets, pipelines and materials for the current drawable size of `view`.
    pub fn initialize(
        view: &ViewDescriptor,
        ctxt: &Context,
        config: OutlineConfig,
    ) -> Result<Self, SetupError> {
        let backend = WgpuBackend::new(ctxt, view, &config)?;
        let (width, height) = backend.targets().size();
        log::info!(
            "outline effect ready: {:?} variant, {}x{} {:?} targets",
            config.variant,
            width,
            height,
            view.color_format
        );

        let variant = config.variant;
        Ok(OutlineEffect::new(backend, SceneBridge::new(config), variant))
    }
}

impl OutlineEffect<DummyBackend> {
    /// An effect recording its GPU work instead of executing it.
    pub fn dummy(view: &ViewDescriptor, config: OutlineConfig) -> Result<Self, SetupError> {
        let backend = DummyBackend::new(view)?;
        let variant = config.variant;
        Ok(OutlineEffect::new(backend, SceneBridge::new(config), variant))
    }
}

impl<B: OutlineBackend, H: SceneUpdateHook> OutlineEffect<B, H> {
    /// Composes a backend and a scene hook.
    pub fn new(backend: B, hook: H, variant: Variant) -> Self {
        OutlineEffect {
            backend,
            hook,
            variant,
            last_miss: None,
        }
    }

    /// Forwards a placement reported by the tracking system to the scene hook.
    pub fn on_object_placed(&mut self, node: &SceneNode3d) {
        self.hook.object_placed(node)
    }

    /// The backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The scene hook.
    #[inline]
    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// The variant being run.
    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn run_frame(
        &mut self,
        frame: Option<B::Frame<'_>>,
        host: &dyn HostScene,
        time: f32,
        overridden: &mut bool,
    ) -> Result<(), FrameMiss> {
        let full = self.hook.update(Pass::FullRender, host, time)?;
        let mut frame = frame.ok_or(FrameMiss::HostPassUnavailable)?;

        let inline = self.variant == Variant::Anchored && self.backend.capture_full(&mut frame);
        if !inline {
            self.backend.render_offscreen(Pass::FullRender, &full);
        }

        for pass in [Pass::OutlineExtrusion, Pass::OutlineMask] {
            log::trace!("entering the {pass} pass");
            let scene = self.hook.update(pass, host, time)?;
            *overridden = true;
            self.backend.render_offscreen(pass, &scene);
        }

        self.backend.composite(&mut frame)
    }
}

impl<B: OutlineBackend, H: SceneUpdateHook> FrameRenderer for OutlineEffect<B, H> {
    type Frame<'f> = B::Frame<'f>;

    fn on_frame_render(
        &mut self,
        frame: Option<B::Frame<'_>>,
        host: &dyn HostScene,
        time: f32,
    ) -> FrameOutcome {
        let mut overridden = false;
        let result = self.run_frame(frame, host, time, &mut overridden);

        if overridden {
            if let Err(miss) = self.hook.update(Pass::FullRender, host, time) {
                log::warn!("could not restore the full render state: {miss}");
            }
        }

        match result {
            Ok(()) => {
                self.last_miss = None;
                FrameOutcome::Composited
            }
            Err(miss) => {
                if self.last_miss != Some(miss) {
                    log::debug!("outline skipped: {miss}");
                }
                self.last_miss = Some(miss);
                FrameOutcome::Skipped(miss)
            }
        }
    }
}
