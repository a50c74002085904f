//! A backend recording what would have been sent to the GPU.

use crate::error::{FrameMiss, SetupError};
use crate::post_processing::backend::OutlineBackend;
use crate::post_processing::{Pass, PassState, SyncedScene, ViewDescriptor};
use crate::procedural::SCREEN_QUAD_VERTEX_COUNT;
use crate::resource::{MaterialRef, RenderTargetSet, TargetDescriptor};

/// One step recorded by the [`DummyBackend`].
#[derive(Clone, Debug)]
pub enum BackendEvent {
    /// A synchronous offscreen submission.
    Offscreen {
        /// The pass rendered.
        pass: Pass,
        /// Index of the submission since the backend was created.
        submission: usize,
        /// State the bridge applied for this pass.
        state: PassState,
        /// Materials of the target mesh at submission time.
        materials: Vec<MaterialRef>,
        /// Visibility of the shadow plane at submission time.
        shadow_plane_visible: bool,
    },
    /// The host frame copied into the Full target on the host encoder.
    InlineFull,
    /// The composite draw.
    Composite {
        /// Number of vertices drawn.
        vertex_count: u32,
        /// Targets bound, by texture slot.
        textures: [Pass; 3],
    },
}

/// Host frame of the [`DummyBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DummyFrame {
    /// Whether the host frame can be copied into the Full target.
    pub copyable: bool,
}

impl Default for DummyFrame {
    fn default() -> Self {
        DummyFrame { copyable: true }
    }
}

/// A GPU-free [`OutlineBackend`] recording every step.
#[derive(Debug)]
pub struct DummyBackend {
    targets: [TargetDescriptor; 3],
    events: Vec<BackendEvent>,
    submissions: usize,
    composite_fails: bool,
}

impl DummyBackend {
    /// Validates `view` the way the wgpu backend does, without allocating anything.
    pub fn new(view: &ViewDescriptor) -> Result<Self, SetupError> {
        let (width, height) = view.drawable_size();
        let allowed = view
            .color_format
            .guaranteed_format_features(wgpu::Features::empty())
            .allowed_usages;
        let targets = RenderTargetSet::descriptors(width, height, view.color_format, allowed)?;

        Ok(DummyBackend {
            targets,
            events: Vec::new(),
            submissions: 0,
            composite_fails: false,
        })
    }

    /// Makes every composite fail as if the targets could not be bound.
    pub fn with_composite_failure(mut self) -> Self {
        self.composite_fails = true;
        self
    }

    /// The targets that would have been allocated, in pass order.
    #[inline]
    pub fn targets(&self) -> &[TargetDescriptor; 3] {
        &self.targets
    }

    /// Events recorded so far.
    #[inline]
    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    /// Returns and forgets the events recorded so far.
    pub fn take_events(&mut self) -> Vec<BackendEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of offscreen submissions since creation.
    #[inline]
    pub fn submissions(&self) -> usize {
        self.submissions
    }
}

impl OutlineBackend for DummyBackend {
    type Frame<'f> = DummyFrame;

    fn render_offscreen(&mut self, pass: Pass, scene: &SyncedScene) {
        log::trace!("dummy offscreen submission #{}: {pass}", self.submissions);
        self.events.push(BackendEvent::Offscreen {
            pass,
            submission: self.submissions,
            state: scene.state,
            materials: scene.targets.mesh.materials().unwrap_or_default(),
            shadow_plane_visible: scene.targets.shadow_plane.is_visible(),
        });
        self.submissions += 1;
    }

    fn capture_full(&mut self, frame: &mut DummyFrame) -> bool {
        if frame.copyable {
            log::trace!("dummy inline full pass");
            self.events.push(BackendEvent::InlineFull);
        }
        frame.copyable
    }

    fn composite(&mut self, _: &mut DummyFrame) -> Result<(), FrameMiss> {
        if self.composite_fails {
            log::warn!("composite skipped: render targets are unavailable");
            return Err(FrameMiss::TargetsUnavailable);
        }

        log::trace!("dummy composite draw");
        self.events.push(BackendEvent::Composite {
            vertex_count: SCREEN_QUAD_VERTEX_COUNT,
            textures: Pass::SEQUENCE,
        });
        Ok(())
    }
}
