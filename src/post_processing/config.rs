//! Outline configuration.

use crate::color::{self, Color};
use crate::context::Context;

/// Where the outlined object lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// AR: a clone of the placed content lives in an offscreen scene and
    /// follows the tracked anchor. The Full image is the host frame itself.
    #[default]
    Anchored,
    /// Non-AR: the object is referenced straight from the live scene and every
    /// pass, Full included, is an offscreen render.
    Direct,
}

/// Names, colors and constants of the outline effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutlineConfig {
    /// Where the outlined object lives.
    pub variant: Variant,
    /// Candidate names of the outlined mesh node; the first one found wins.
    pub mesh_names: Vec<String>,
    /// Name of the shadow-catcher plane.
    pub shadow_plane_name: String,
    /// Name of the directional light of the placed content.
    pub light_name: String,
    /// Name given to the clone of placed content.
    pub placed_container_name: String,
    /// World distance the extrusion pushes vertices along their normal.
    pub extrusion_magnitude: f32,
    /// Flat color of the extrusion pass.
    pub extrusion_color: Color,
    /// Flat color of the mask pass.
    pub mask_color: Color,
    /// Color drawn where the outline is.
    pub outline_color: Color,
    /// Color channel level above which the composite counts a target pixel as covered.
    pub threshold: f32,
    /// Clear color of every offscreen pass.
    pub clear_color: Color,
    /// Edge length of the cube hiding the background in the direct variant.
    pub occluder_extent: f32,
    /// Color of that cube.
    pub occluder_color: Color,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        OutlineConfig {
            variant: Variant::Anchored,
            mesh_names: vec!["NodeMesh".to_string(), "ShipMesh".to_string()],
            shadow_plane_name: "ShadowPlane".to_string(),
            light_name: "DirectionalLight".to_string(),
            placed_container_name: "NodeContainerParent".to_string(),
            extrusion_magnitude: 0.1,
            extrusion_color: color::BLUE,
            mask_color: color::RED,
            outline_color: color::YELLOW,
            threshold: 0.5,
            clear_color: color::BLACK,
            occluder_extent: 100.0,
            occluder_color: color::BLACK,
        }
    }
}

impl OutlineConfig {
    /// Sets the variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Replaces the candidate mesh names.
    pub fn with_mesh_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mesh_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the extrusion distance.
    pub fn with_extrusion_magnitude(mut self, magnitude: f32) -> Self {
        self.extrusion_magnitude = magnitude;
        self
    }

    /// Sets the outline color.
    pub fn with_outline_color(mut self, color: Color) -> Self {
        self.outline_color = color;
        self
    }

    /// Sets the composite threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the occluder size.
    pub fn with_occluder_extent(mut self, extent: f32) -> Self {
        self.occluder_extent = extent;
        self
    }
}

/// Size and formats of the host view the effect composites into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewDescriptor {
    /// Width in logical points.
    pub width: f32,
    /// Height in logical points.
    pub height: f32,
    /// Device pixels per logical point.
    pub scale_factor: f32,
    /// Color format of the host frame.
    pub color_format: wgpu::TextureFormat,
    /// Depth format of the offscreen renders.
    pub depth_format: wgpu::TextureFormat,
}

impl ViewDescriptor {
    /// A view whose logical size is already in device pixels.
    pub fn new(width: u32, height: u32, color_format: wgpu::TextureFormat) -> Self {
        ViewDescriptor {
            width: width as f32,
            height: height as f32,
            scale_factor: 1.0,
            color_format,
            depth_format: Context::depth_format(),
        }
    }

    /// Sets the scale factor.
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Drawable size in device pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        let to_pixels = |v: f32| (v * self.scale_factor).round().max(0.0) as u32;
        (to_pixels(self.width), to_pixels(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let config = OutlineConfig::default();
        assert_eq!(config.mesh_names, vec!["NodeMesh", "ShipMesh"]);
        assert_eq!(config.placed_container_name, "NodeContainerParent");
        assert_eq!(config.extrusion_magnitude, 0.1);
        assert_eq!(config.variant, Variant::Anchored);
    }

    #[test]
    fn test_drawable_size_applies_scale() {
        let view = ViewDescriptor {
            width: 512.0,
            height: 384.0,
            scale_factor: 2.0,
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            depth_format: wgpu::TextureFormat::Depth32Float,
        };
        assert_eq!(view.drawable_size(), (1024, 768));
        assert_eq!(
            ViewDescriptor::new(10, 20, wgpu::TextureFormat::Bgra8Unorm)
                .with_scale_factor(1.5)
                .drawable_size(),
            (15, 30)
        );
    }
}
