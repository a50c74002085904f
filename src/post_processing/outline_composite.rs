//! The final full-screen pass combining the three outline targets.

use crate::builtin::ShaderLibrary;
use crate::color;
use crate::context::Context;
use crate::error::{FrameMiss, SetupError};
use crate::post_processing::{OutlineConfig, Pass};
use crate::resource::{RenderTargetSet, ScreenQuad};
use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CompositeUniforms {
    outline_color: [f32; 4],
    viewport_size: [f32; 2],
    threshold: f32,
    _padding: f32,
}

impl CompositeUniforms {
    fn new(config: &OutlineConfig, (width, height): (u32, u32)) -> Self {
        CompositeUniforms {
            outline_color: color::to_array(config.outline_color),
            viewport_size: [width as f32, height as f32],
            threshold: config.threshold,
            _padding: 0.0,
        }
    }
}

/// Draws the outline color where the extrusion target covers a pixel the mask
/// target does not, and the full target everywhere else.
pub struct OutlineComposite {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    quad: ScreenQuad,
}

impl OutlineComposite {
    /// Builds the composite pipeline and binds the three targets once.
    pub fn new(
        ctxt: &Context,
        library: &ShaderLibrary,
        targets: &RenderTargetSet,
        output_format: wgpu::TextureFormat,
        config: &OutlineConfig,
    ) -> Result<Self, SetupError> {
        let (vertex_module, vertex_entry) = library.program("quad_vertex")?;
        let (fragment_module, fragment_entry) = library.program("quad_fragment")?;

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        };

        let bind_group_layout = ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("outline_composite_bind_group_layout"),
            entries: &[
                texture_entry(Pass::FullRender.texture_slot()),
                texture_entry(Pass::OutlineExtrusion.texture_slot()),
                texture_entry(Pass::OutlineMask.texture_slot()),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let uniforms = CompositeUniforms::new(config, targets.size());
        let uniform_buffer = ctxt.create_buffer_init(
            Some("outline_composite_uniforms"),
            bytemuck::bytes_of(&uniforms),
            wgpu::BufferUsages::UNIFORM,
        );

        let texture = |pass: Pass| wgpu::BindGroupEntry {
            binding: pass.texture_slot(),
            resource: wgpu::BindingResource::TextureView(&targets.get(pass).view),
        };

        let bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("outline_composite_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                texture(Pass::FullRender),
                texture(Pass::OutlineExtrusion),
                texture(Pass::OutlineMask),
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(targets.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("outline_composite_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("outline_composite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex_module,
                entry_point: Some(vertex_entry),
                buffers: &[ScreenQuad::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_module,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })?;

        Ok(OutlineComposite {
            pipeline,
            bind_group,
            quad: ScreenQuad::new(ctxt),
        })
    }

    /// Number of vertices of one composite draw.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.quad.vertex_count()
    }

    /// Records the composite draw on top of `output_view`, keeping its content.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output_view: &wgpu::TextureView,
    ) -> Result<(), FrameMiss> {
        let Some(vertices) = self.quad.buffer() else {
            log::warn!("composite skipped: the screen quad is not on the GPU");
            return Err(FrameMiss::TargetsUnavailable);
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("outline_composite_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertices.slice(..));
        render_pass.draw(0..self.vertex_count(), 0..1);

        log::trace!("composite draw: {} vertices", self.vertex_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 32);
    }

    #[test]
    fn test_uniforms_carry_the_configured_outline() {
        let config = OutlineConfig::default()
            .with_threshold(0.25)
            .with_outline_color(color::WHITE);
        let uniforms = CompositeUniforms::new(&config, (640, 480));

        assert_eq!(uniforms.threshold, 0.25);
        assert_eq!(uniforms.outline_color, color::to_array(color::WHITE));
        assert_eq!(uniforms.viewport_size, [640.0, 480.0]);
    }
}
