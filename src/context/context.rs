//! wgpu rendering context.
//!
//! The context is handed explicitly to every constructor that allocates GPU
//! resources. The outline effect never looks up a global device.

use crate::error::SetupError;
use std::sync::Arc;

/// The wgpu rendering context containing all GPU resources needed for rendering.
///
/// This struct is cloneable. It wraps wgpu resources in Arc to allow sharing
/// between the host renderer and the outline effect.
#[derive(Clone)]
pub struct Context {
    /// The wgpu device used for creating GPU resources.
    pub device: Arc<wgpu::Device>,
    /// The wgpu queue used for submitting commands.
    pub queue: Arc<wgpu::Queue>,
    /// Features enabled on the device.
    pub features: wgpu::Features,
    /// Color format of the host's on-screen frames.
    pub surface_format: wgpu::TextureFormat,
}

impl Context {
    /// Wraps a device and queue created by the host renderer.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let features = device.features();
        Context {
            device,
            queue,
            features,
            surface_format,
        }
    }

    /// Requests a device without any surface.
    ///
    /// Fails with [`SetupError::NoCompatibleDevice`] when no adapter or device
    /// can be obtained.
    pub async fn request_headless(
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| {
                log::warn!("no adapter: {e}");
                SetupError::NoCompatibleDevice
            })?;

        #[cfg(target_arch = "wasm32")]
        let limits = wgpu::Limits::downlevel_webgl2_defaults();
        #[cfg(not(target_arch = "wasm32"))]
        let limits = wgpu::Limits::default();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("xray3d device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                ..Default::default()
            })
            .await
            .map_err(|e| {
                log::warn!("device request failed: {e}");
                SetupError::NoCompatibleDevice
            })?;

        Ok(Context::new(Arc::new(device), Arc::new(queue), surface_format))
    }

    /// Blocking version of [`Context::request_headless`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn request_headless_blocking(
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        pollster::block_on(Self::request_headless(surface_format))
    }

    /// Creates a new buffer on the GPU with specified parameters.
    ///
    /// # Arguments
    /// * `label` - Debug label for the buffer
    /// * `size` - Size of the buffer in bytes
    /// * `usage` - Buffer usage flags
    pub fn create_buffer_simple(
        &self,
        label: Option<&str>,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Creates a new buffer initialized with data.
    pub fn create_buffer_init(
        &self,
        label: Option<&str>,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents,
                usage,
            })
    }

    /// Writes data to a buffer.
    pub fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    /// Creates a new texture on the GPU.
    pub fn create_texture(&self, desc: &wgpu::TextureDescriptor) -> wgpu::Texture {
        self.device.create_texture(desc)
    }

    /// Creates a new sampler.
    pub fn create_sampler(&self, desc: &wgpu::SamplerDescriptor) -> wgpu::Sampler {
        self.device.create_sampler(desc)
    }

    /// Creates a new bind group layout.
    pub fn create_bind_group_layout(
        &self,
        desc: &wgpu::BindGroupLayoutDescriptor,
    ) -> wgpu::BindGroupLayout {
        self.device.create_bind_group_layout(desc)
    }

    /// Creates a new bind group.
    pub fn create_bind_group(&self, desc: &wgpu::BindGroupDescriptor) -> wgpu::BindGroup {
        self.device.create_bind_group(desc)
    }

    /// Creates a new pipeline layout.
    pub fn create_pipeline_layout(
        &self,
        desc: &wgpu::PipelineLayoutDescriptor,
    ) -> wgpu::PipelineLayout {
        self.device.create_pipeline_layout(desc)
    }

    /// Creates a render pipeline, turning validation errors into a [`SetupError`].
    ///
    /// wgpu reports pipeline errors asynchronously; the creation is wrapped in a
    /// validation error scope so a broken pipeline fails setup instead of the
    /// first frame.
    pub fn create_render_pipeline(
        &self,
        desc: &wgpu::RenderPipelineDescriptor,
    ) -> Result<wgpu::RenderPipeline, SetupError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.device.create_render_pipeline(desc);
        self.check_scope(desc.label.unwrap_or("render_pipeline"))?;
        Ok(pipeline)
    }

    /// Creates a new shader module from WGSL source.
    ///
    /// Compilation errors are reported as [`SetupError::PipelineCompilation`].
    pub fn create_shader_module(
        &self,
        label: &str,
        source: &str,
    ) -> Result<wgpu::ShaderModule, SetupError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.check_scope(label)?;
        Ok(module)
    }

    fn check_scope(&self, label: &str) -> Result<(), SetupError> {
        let scope = self.device.pop_error_scope();

        #[cfg(not(target_arch = "wasm32"))]
        let error = pollster::block_on(scope);
        // Error scopes cannot be awaited synchronously in the browser.
        #[cfg(target_arch = "wasm32")]
        let error: Option<wgpu::Error> = {
            drop(scope);
            None
        };

        match error {
            Some(error) => Err(SetupError::PipelineCompilation {
                label: label.to_string(),
                message: error.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Creates a new command encoder.
    pub fn create_command_encoder(&self, label: Option<&str>) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label })
    }

    /// Submits command buffers to the GPU queue.
    pub fn submit<I: IntoIterator<Item = wgpu::CommandBuffer>>(&self, command_buffers: I) {
        self.queue.submit(command_buffers);
    }

    /// Submits one command buffer and blocks until the GPU has executed it.
    pub fn submit_and_wait(&self, command_buffer: wgpu::CommandBuffer) {
        let _ = self.queue.submit(std::iter::once(command_buffer));
        if let Err(err) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
            log::warn!("waiting for the GPU failed, the target may be incomplete: {err}");
        }
    }

    /// Usage flags the device guarantees for `format`.
    pub fn allowed_usages(&self, format: wgpu::TextureFormat) -> wgpu::TextureUsages {
        format.guaranteed_format_features(self.features).allowed_usages
    }

    /// Gets the depth texture format used for depth attachments.
    pub fn depth_format() -> wgpu::TextureFormat {
        wgpu::TextureFormat::Depth32Float
    }
}
