//! Materials as plain values.
//!
//! A material carries no GPU state. The offscreen renderer picks a pipeline
//! from its [`PipelineKey`] and feeds the color and vertex-stage parameters
//! through per-object uniforms, so one material can be shared by many objects
//! and swapped in and out of an object's material list freely.

use crate::color::Color;
use std::rc::Rc;

/// Shared handle to a material. Identity (`Rc::ptr_eq`) is what material swaps preserve.
pub type MaterialRef = Rc<Material3d>;

/// Fragment-stage behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shading {
    /// Lambert lighting from the scene's directional light plus ambient.
    Lit,
    /// One flat color, no lighting.
    Constant,
    /// Invisible surface that only shows the shadows projected onto it.
    ShadowCatcher,
}

/// Vertex-stage modifier.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexStage {
    /// Positions and normals are transformed as-is.
    Standard,
    /// Every vertex is moved along its normal by a fixed world distance.
    ExtrudeAlongNormal {
        /// Offset in world units.
        magnitude: f32,
    },
}

/// Face culling mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullMode {
    /// Back faces are discarded.
    Back,
    /// Both sides are drawn.
    None,
}

impl CullMode {
    /// The wgpu equivalent.
    #[inline]
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::Back => Some(wgpu::Face::Back),
            CullMode::None => None,
        }
    }
}

/// How an object's surface is drawn.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material3d {
    /// Debug name.
    pub name: String,
    /// Fragment-stage behavior.
    pub shading: Shading,
    /// Vertex-stage modifier.
    pub vertex_stage: VertexStage,
    /// Base color for lit shading, output color for constant shading.
    pub color: Color,
    /// Face culling.
    pub cull_mode: CullMode,
}

/// The parts of a material that select a render pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Whether the extrusion vertex program is used.
    pub extrude: bool,
    /// Fragment-stage behavior.
    pub shading: Shading,
    /// Face culling.
    pub cull_mode: CullMode,
}

impl Material3d {
    /// A lit, back-face culled material.
    pub fn lit(name: &str, color: Color) -> Self {
        Material3d {
            name: name.to_string(),
            shading: Shading::Lit,
            vertex_stage: VertexStage::Standard,
            color,
            cull_mode: CullMode::Back,
        }
    }

    /// A flat-colored, unlit material.
    pub fn constant(name: &str, color: Color) -> Self {
        Material3d {
            shading: Shading::Constant,
            ..Material3d::lit(name, color)
        }
    }

    /// An invisible material that only receives projected shadows.
    pub fn shadow_catcher(name: &str) -> Self {
        Material3d {
            shading: Shading::ShadowCatcher,
            cull_mode: CullMode::None,
            ..Material3d::lit(name, crate::color::BLACK)
        }
    }

    /// Replaces the vertex stage.
    pub fn with_vertex_stage(mut self, vertex_stage: VertexStage) -> Self {
        self.vertex_stage = vertex_stage;
        self
    }

    /// Replaces the culling mode.
    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Distance vertices are pushed along their normal, 0 for the standard stage.
    #[inline]
    pub fn extrusion(&self) -> f32 {
        match self.vertex_stage {
            VertexStage::Standard => 0.0,
            VertexStage::ExtrudeAlongNormal { magnitude } => magnitude,
        }
    }

    /// The pipeline this material is drawn with.
    #[inline]
    pub fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            extrude: matches!(self.vertex_stage, VertexStage::ExtrudeAlongNormal { .. }),
            shading: self.shading,
            cull_mode: self.cull_mode,
        }
    }

    /// Wraps this material in a shared handle.
    pub fn into_ref(self) -> MaterialRef {
        Rc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED};

    #[test]
    fn test_pipeline_key_tracks_vertex_stage() {
        let plain = Material3d::constant("mask", RED);
        assert!(!plain.pipeline_key().extrude);
        assert_eq!(plain.extrusion(), 0.0);

        let extruded = Material3d::constant("extrusion", BLUE)
            .with_vertex_stage(VertexStage::ExtrudeAlongNormal { magnitude: 0.1 })
            .with_cull_mode(CullMode::None);
        let key = extruded.pipeline_key();
        assert!(key.extrude);
        assert_eq!(key.cull_mode, CullMode::None);
        assert_eq!(extruded.extrusion(), 0.1);
    }

    #[test]
    fn test_shadow_catcher_is_double_sided() {
        let m = Material3d::shadow_catcher("plane");
        assert_eq!(m.shading, Shading::ShadowCatcher);
        assert_eq!(m.cull_mode.to_wgpu(), None);
    }
}
