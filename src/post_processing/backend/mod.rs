//! Where the passes of an outline frame are executed.
//!
//! The orchestrator only decides what runs and in which order. A backend turns
//! each step into GPU work, or into a record for tests.

pub use self::dummy::{BackendEvent, DummyBackend, DummyFrame};
pub use self::wgpu_backend::{PostProcessingContext, WgpuBackend};

use crate::error::FrameMiss;
use crate::post_processing::{Pass, SyncedScene};

mod dummy;
mod wgpu_backend;

/// Executes the steps of an outline frame.
pub trait OutlineBackend {
    /// The host frame the composite is drawn into.
    type Frame<'f>;

    /// Renders `scene` into the target of `pass` and waits for the GPU.
    fn render_offscreen(&mut self, pass: Pass, scene: &SyncedScene);

    /// Copies the host frame into the Full target on the host's own encoder.
    ///
    /// Returns `false` when the frame cannot be copied. The Full target must
    /// then be rendered offscreen.
    fn capture_full(&mut self, frame: &mut Self::Frame<'_>) -> bool;

    /// Draws the composite of the three targets into the host frame.
    fn composite(&mut self, frame: &mut Self::Frame<'_>) -> Result<(), FrameMiss>;
}
