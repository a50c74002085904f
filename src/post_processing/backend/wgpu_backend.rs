use crate::builtin::ShaderLibrary;
use crate::color::Color;
use crate::context::Context;
use crate::error::{FrameMiss, SetupError};
use crate::post_processing::backend::OutlineBackend;
use crate::post_processing::{OutlineComposite, OutlineConfig, Pass, SyncedScene, ViewDescriptor};
use crate::renderer::OffscreenRenderer;
use crate::resource::RenderTargetSet;

/// The host frame handed to the outline effect.
pub struct PostProcessingContext<'a> {
    /// The host's primary command encoder, submitted by the host after the effect returns.
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// View of the host frame, already holding the rendered live scene.
    pub output_view: &'a wgpu::TextureView,
    /// The texture behind `output_view`, when the host can expose it.
    pub output_texture: Option<&'a wgpu::Texture>,
}

/// Runs outline frames on a wgpu device.
pub struct WgpuBackend {
    targets: RenderTargetSet,
    renderer: OffscreenRenderer,
    composite: OutlineComposite,
    clear_color: Color,
}

impl WgpuBackend {
    /// Allocates the targets and builds every pipeline for `view`.
    pub fn new(
        ctxt: &Context,
        view: &ViewDescriptor,
        config: &OutlineConfig,
    ) -> Result<Self, SetupError> {
        let (width, height) = view.drawable_size();
        let targets = RenderTargetSet::allocate(ctxt, width, height, view.color_format)?;
        let library = ShaderLibrary::new(ctxt)?;
        let renderer = OffscreenRenderer::new(
            ctxt,
            &library,
            width,
            height,
            view.color_format,
            view.depth_format,
        )?;
        let composite =
            OutlineComposite::new(ctxt, &library, &targets, view.color_format, config)?;

        Ok(WgpuBackend {
            targets,
            renderer,
            composite,
            clear_color: config.clear_color,
        })
    }

    /// The three outline targets.
    #[inline]
    pub fn targets(&self) -> &RenderTargetSet {
        &self.targets
    }
}

impl OutlineBackend for WgpuBackend {
    type Frame<'f> = PostProcessingContext<'f>;

    fn render_offscreen(&mut self, pass: Pass, scene: &SyncedScene) {
        log::trace!("offscreen submission: {pass} pass");
        let target = self.targets.get(pass);
        self.renderer
            .render(&scene.root, &scene.camera, &target.view, self.clear_color);
    }

    fn capture_full(&mut self, frame: &mut PostProcessingContext<'_>) -> bool {
        let Some(source) = frame.output_texture else {
            return false;
        };

        let (width, height) = self.targets.size();
        let copyable = source.usage().contains(wgpu::TextureUsages::COPY_SRC)
            && source.format() == self.targets.format()
            && source.width() == width
            && source.height() == height;
        if !copyable {
            log::trace!("host frame cannot be copied, rendering the full pass offscreen");
            return false;
        }

        frame.encoder.copy_texture_to_texture(
            source.as_image_copy(),
            self.targets.get(Pass::FullRender).texture.as_image_copy(),
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        log::trace!("inline full pass: host frame copied");
        true
    }

    fn composite(&mut self, frame: &mut PostProcessingContext<'_>) -> Result<(), FrameMiss> {
        self.composite.draw(frame.encoder, frame.output_view)
    }
}
