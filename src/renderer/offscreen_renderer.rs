//! A scene renderer drawing into an explicit target instead of the screen.

use crate::builtin::ShaderLibrary;
use crate::camera::CameraState;
use crate::color::{self, Color};
use crate::context::Context;
use crate::error::SetupError;
use crate::light::ShadowMode;
use crate::resource::{
    CullMode, DynamicUniformBuffer, GpuMesh3d, MaterialRef, MeshBuffers, PipelineKey, Shading,
};
use crate::scene::SceneNode3d;
use bytemuck::{Pod, Zeroable};
use glamx::{Mat3, Mat4, Vec3, Vec4};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const AMBIENT: f32 = 0.3;
const SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.5);
/// Lift of projected shadows above their receiving plane.
const SHADOW_OFFSET: f32 = 1.0e-3;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl ObjectUniforms {
    fn new(model: Mat4, color: Color, extrusion: f32) -> Self {
        let normal_matrix = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        ObjectUniforms {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: color::to_array(color),
            params: [extrusion, 0.0, 0.0, 0.0],
        }
    }
}

/// The first enabled directional light of a scene, in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
struct SceneLight {
    direction: Vec3,
    color: Color,
    intensity: f32,
    casts_shadow: bool,
    shadow_mode: ShadowMode,
}

/// A plane receiving projected shadows.
#[derive(Copy, Clone, Debug, PartialEq)]
struct ShadowReceiver {
    point: Vec3,
    normal: Vec3,
}

struct DrawItem {
    model: Mat4,
    mesh: Rc<RefCell<GpuMesh3d>>,
    material: MaterialRef,
    casts_shadow: bool,
}

/// Everything a scene needs drawn, flattened in depth-first order.
#[derive(Default)]
struct DrawList {
    items: Vec<DrawItem>,
    receivers: Vec<ShadowReceiver>,
    light: Option<SceneLight>,
}

impl DrawList {
    fn collect(root: &SceneNode3d) -> DrawList {
        let mut list = DrawList::default();
        list.visit(root, Mat4::IDENTITY);
        list
    }

    fn visit(&mut self, node: &SceneNode3d, parent: Mat4) {
        let data = node.data();
        if !data.is_visible() {
            return;
        }

        let model = parent * data.local_matrix();

        if let Some(object) = data.object() {
            if let Some(material) = object.material() {
                if material.shading == Shading::ShadowCatcher {
                    self.receivers.push(ShadowReceiver {
                        point: model.transform_point3(Vec3::ZERO),
                        normal: model.transform_vector3(Vec3::Y).normalize_or(Vec3::Y),
                    });
                } else {
                    self.items.push(DrawItem {
                        model,
                        mesh: object.mesh().clone(),
                        material: material.clone(),
                        casts_shadow: data.casts_shadow(),
                    });
                }
            }
        }

        if self.light.is_none() {
            if let Some(light) = data.light().filter(|l| l.enabled) {
                self.light = Some(SceneLight {
                    direction: model
                        .transform_vector3(light.direction)
                        .normalize_or(Vec3::NEG_Y),
                    color: light.color,
                    intensity: light.intensity,
                    casts_shadow: light.casts_shadow,
                    shadow_mode: light.shadow_mode,
                });
            }
        }

        for child in data.children() {
            self.visit(child, model);
        }
    }
}

/// Projects points along `light_dir` onto the plane through `plane_point` with normal `plane_normal`.
///
/// Returns `None` when the light does not hit the front of the plane.
pub fn planar_shadow_matrix(plane_normal: Vec3, plane_point: Vec3, light_dir: Vec3) -> Option<Mat4> {
    let n = plane_normal.normalize_or_zero();
    let l = light_dir.normalize_or_zero();
    let n_dot_l = n.dot(l);

    if n_dot_l > -1.0e-4 {
        return None;
    }

    let k = 1.0 / n_dot_l;
    let d = n.dot(plane_point);
    let column = |axis: Vec3, n_axis: f32| (axis - l * (n_axis * k)).extend(0.0);

    Some(Mat4::from_cols(
        column(Vec3::X, n.x),
        column(Vec3::Y, n.y),
        column(Vec3::Z, n.z),
        (l * (d * k)).extend(1.0),
    ))
}

struct PreparedDraw {
    pipeline: PipelineKey,
    buffers: MeshBuffers,
    offset: u32,
    shadows: Vec<u32>,
}

/// The second scene renderer, separate from the host's on-screen one.
///
/// Every [`OffscreenRenderer::render`] records one command buffer, submits it and waits
/// for the GPU, so the target is complete when the call returns.
pub struct OffscreenRenderer {
    ctxt: Context,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    shadow_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_uniforms: DynamicUniformBuffer<ObjectUniforms>,
    object_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    size: (u32, u32),
}

impl OffscreenRenderer {
    /// Builds every scene pipeline for targets of the given size and formats.
    pub fn new(
        ctxt: &Context,
        library: &ShaderLibrary,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self, SetupError> {
        if width == 0 || height == 0 {
            return Err(SetupError::InvalidViewport { width, height });
        }

        let frame_layout = ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("offscreen_frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let object_layout = ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("offscreen_object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: DynamicUniformBuffer::<ObjectUniforms>::binding_size(),
                },
                count: None,
            }],
        });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("offscreen_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let targets = PipelineTargets {
            layout: &pipeline_layout,
            color_format,
            depth_format,
        };

        let mut pipelines = HashMap::new();
        for extrude in [false, true] {
            for shading in [Shading::Lit, Shading::Constant] {
                for cull_mode in [CullMode::Back, CullMode::None] {
                    let key = PipelineKey {
                        extrude,
                        shading,
                        cull_mode,
                    };
                    let _ = pipelines.insert(key, targets.scene_pipeline(ctxt, library, key)?);
                }
            }
        }

        let shadow_pipeline = targets.shadow_pipeline(ctxt, library)?;

        let frame_buffer = ctxt.create_buffer_simple(
            Some("offscreen_frame_uniforms"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("offscreen_frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_uniforms =
            DynamicUniformBuffer::with_capacity(ctxt, "offscreen_object_uniforms", 16);
        let object_bind_group =
            Self::create_object_bind_group(ctxt, &object_layout, &object_uniforms);

        let depth_view = ctxt
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("offscreen_depth"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: depth_format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(OffscreenRenderer {
            ctxt: ctxt.clone(),
            pipelines,
            shadow_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_uniforms,
            object_bind_group,
            depth_view,
            size: (width, height),
        })
    }

    fn create_object_bind_group(
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<ObjectUniforms>,
    ) -> wgpu::BindGroup {
        ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("offscreen_object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms.buffer(),
                    offset: 0,
                    size: DynamicUniformBuffer::<ObjectUniforms>::binding_size(),
                }),
            }],
        })
    }

    /// Size of the targets this renderer draws into.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Renders `scene` seen from `camera` into `target_view`, then blocks until the GPU is done.
    ///
    /// The target is cleared to `clear` first. Meshes are uploaded on first use.
    pub fn render(
        &mut self,
        scene: &SceneNode3d,
        camera: &CameraState,
        target_view: &wgpu::TextureView,
        clear: Color,
    ) {
        let list = DrawList::collect(scene);

        let (light_dir, light_color) = match list.light {
            Some(light) => (
                light.direction.extend(1.0),
                Vec4::new(light.color.r, light.color.g, light.color.b, 1.0) * light.intensity,
            ),
            None => (Vec4::new(0.0, -1.0, 0.0, 0.0), Vec4::ZERO),
        };
        let frame = FrameUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_dir: light_dir.to_array(),
            light_color: light_color.to_array(),
            ambient: [AMBIENT, AMBIENT, AMBIENT, 1.0],
        };
        self.ctxt
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let shadow_light = list
            .light
            .filter(|l| l.casts_shadow)
            .map(|l| (l.direction, l.shadow_mode));

        self.object_uniforms.clear();
        let mut draws = Vec::with_capacity(list.items.len());

        for item in list.items.iter() {
            let key = item.material.pipeline_key();
            if !self.pipelines.contains_key(&key) {
                continue;
            }

            let Some(buffers) = item.mesh.borrow_mut().ensure_on_gpu(&self.ctxt) else {
                continue;
            };

            let offset = self.object_uniforms.push(&ObjectUniforms::new(
                item.model,
                item.material.color,
                item.material.extrusion(),
            ));

            let mut shadows = Vec::new();
            if let Some((direction, _)) = shadow_light.filter(|_| item.casts_shadow) {
                for receiver in list.receivers.iter() {
                    let lifted = receiver.point + receiver.normal * SHADOW_OFFSET;
                    if let Some(projection) =
                        planar_shadow_matrix(receiver.normal, lifted, direction)
                    {
                        shadows.push(self.object_uniforms.push(&ObjectUniforms::new(
                            projection * item.model,
                            SHADOW_COLOR,
                            0.0,
                        )));
                    }
                }
            }

            draws.push(PreparedDraw {
                pipeline: key,
                buffers,
                offset,
                shadows,
            });
        }

        if self.object_uniforms.flush(&self.ctxt) {
            self.object_bind_group = Self::create_object_bind_group(
                &self.ctxt,
                &self.object_layout,
                &self.object_uniforms,
            );
        }

        let deferred_shadows = !matches!(shadow_light, Some((_, ShadowMode::Forward)));

        let mut encoder = self
            .ctxt
            .create_command_encoder(Some("offscreen_render_encoder"));
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("offscreen_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color::to_wgpu(clear)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for draw in draws.iter() {
                let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                Self::draw_mesh(&mut pass, &self.object_bind_group, &draw.buffers, draw.offset);

                if !deferred_shadows {
                    pass.set_pipeline(&self.shadow_pipeline);
                    for offset in draw.shadows.iter() {
                        Self::draw_mesh(&mut pass, &self.object_bind_group, &draw.buffers, *offset);
                    }
                }
            }

            if deferred_shadows {
                pass.set_pipeline(&self.shadow_pipeline);
                for draw in draws.iter() {
                    for offset in draw.shadows.iter() {
                        Self::draw_mesh(&mut pass, &self.object_bind_group, &draw.buffers, *offset);
                    }
                }
            }
        }

        log::trace!(
            "offscreen render: {} draws, {} shadow receivers",
            draws.len(),
            list.receivers.len()
        );
        self.ctxt.submit_and_wait(encoder.finish());
    }

    fn draw_mesh(
        pass: &mut wgpu::RenderPass<'_>,
        bind_group: &wgpu::BindGroup,
        buffers: &MeshBuffers,
        offset: u32,
    ) {
        pass.set_bind_group(1, bind_group, &[offset]);
        pass.set_vertex_buffer(0, buffers.coords.slice(..));
        pass.set_vertex_buffer(1, buffers.normals.slice(..));
        pass.set_index_buffer(buffers.faces.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..buffers.index_count, 0, 0..1);
    }
}

struct PipelineTargets<'a> {
    layout: &'a wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
}

impl PipelineTargets<'_> {
    fn scene_pipeline(
        &self,
        ctxt: &Context,
        library: &ShaderLibrary,
        key: PipelineKey,
    ) -> Result<wgpu::RenderPipeline, SetupError> {
        let vertex = if key.extrude {
            "extrusion_vertex"
        } else {
            "scene_vertex"
        };
        let fragment = match key.shading {
            Shading::Lit => "lit_fragment",
            _ => "flat_fragment",
        };

        self.build(
            ctxt,
            library,
            "offscreen_scene_pipeline",
            (vertex, fragment),
            key.cull_mode,
            None,
            true,
        )
    }

    fn shadow_pipeline(
        &self,
        ctxt: &Context,
        library: &ShaderLibrary,
    ) -> Result<wgpu::RenderPipeline, SetupError> {
        self.build(
            ctxt,
            library,
            "offscreen_shadow_pipeline",
            ("scene_vertex", "flat_fragment"),
            CullMode::None,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        )
    }

    fn build(
        &self,
        ctxt: &Context,
        library: &ShaderLibrary,
        label: &str,
        (vertex, fragment): (&str, &str),
        cull_mode: CullMode,
        blend: Option<wgpu::BlendState>,
        depth_write_enabled: bool,
    ) -> Result<wgpu::RenderPipeline, SetupError> {
        let (vertex_module, vertex_entry) = library.program(vertex)?;
        let (fragment_module, fragment_entry) = library.program(fragment)?;
        let buffers = GpuMesh3d::vertex_layouts();

        ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: vertex_module,
                entry_point: Some(vertex_entry),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_module,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: cull_mode.to_wgpu(),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Light;
    use crate::resource::Material3d;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1.0e-5
    }

    #[test]
    fn test_shadow_matrix_projects_straight_down() {
        let m = planar_shadow_matrix(Vec3::Y, Vec3::ZERO, Vec3::NEG_Y).unwrap();
        assert!(close(
            m.project_point3(Vec3::new(1.0, 2.0, 3.0)),
            Vec3::new(1.0, 0.0, 3.0)
        ));
    }

    #[test]
    fn test_shadow_matrix_follows_oblique_light() {
        let m =
            planar_shadow_matrix(Vec3::Y, Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0))
                .unwrap();
        assert!(close(
            m.project_point3(Vec3::new(0.0, 2.0, 0.0)),
            Vec3::new(1.0, 1.0, 0.0)
        ));
        // Points on the plane stay in place.
        assert!(close(
            m.project_point3(Vec3::new(4.0, 1.0, -2.0)),
            Vec3::new(4.0, 1.0, -2.0)
        ));
    }

    #[test]
    fn test_no_shadow_from_below_or_grazing() {
        assert!(planar_shadow_matrix(Vec3::Y, Vec3::ZERO, Vec3::Y).is_none());
        assert!(planar_shadow_matrix(Vec3::Y, Vec3::ZERO, Vec3::X).is_none());
    }

    #[test]
    fn test_draw_list_skips_hidden_and_catchers() {
        let red = Material3d::constant("red", color::RED).into_ref();
        let mut root = SceneNode3d::empty();
        let mut shown = root.add_cube(1.0, 1.0, 1.0, red.clone());
        shown.set_position(Vec3::X);
        root.add_cube(1.0, 1.0, 1.0, red).set_visible(false);
        root.add_cube(1.0, 0.01, 1.0, Material3d::shadow_catcher("plane").into_ref());
        root.add_light(Light::directional(Vec3::NEG_Y));

        let list = DrawList::collect(&root);
        assert_eq!(list.items.len(), 1);
        assert!(close(list.items[0].model.transform_point3(Vec3::ZERO), Vec3::X));
        assert_eq!(list.receivers.len(), 1);
        assert!(close(list.receivers[0].normal, Vec3::Y));
        assert!(close(list.light.unwrap().direction, Vec3::NEG_Y));
    }

    #[test]
    fn test_draw_list_ignores_disabled_lights() {
        let mut root = SceneNode3d::empty();
        let mut light = Light::directional(Vec3::NEG_Z);
        light.enabled = false;
        root.add_light(light);
        root.add_light(Light::directional(Vec3::NEG_Y));

        let list = DrawList::collect(&root);
        assert!(close(list.light.unwrap().direction, Vec3::NEG_Y));
    }

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 112);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 160);
    }
}
