//! The material overrides swapped onto the outlined object.

use crate::post_processing::OutlineConfig;
use crate::resource::{CullMode, Material3d, MaterialRef, VertexStage};

/// The extrusion and mask overrides, plus the occluder material of the direct variant.
///
/// Materials are immutable values, so the same handles are reused every frame.
#[derive(Clone, Debug)]
pub struct MaterialBank {
    extrusion: MaterialRef,
    mask: MaterialRef,
    occluder: MaterialRef,
}

impl MaterialBank {
    /// Builds the overrides from the configured colors and extrusion distance.
    pub fn new(config: &OutlineConfig) -> Self {
        let extrusion = Material3d::constant("outline_extrusion", config.extrusion_color)
            .with_vertex_stage(VertexStage::ExtrudeAlongNormal {
                magnitude: config.extrusion_magnitude,
            })
            .with_cull_mode(CullMode::None);
        let mask =
            Material3d::constant("outline_mask", config.mask_color).with_cull_mode(CullMode::Back);
        let occluder = Material3d::constant("outline_occluder", config.occluder_color)
            .with_cull_mode(CullMode::None);

        MaterialBank {
            extrusion: extrusion.into_ref(),
            mask: mask.into_ref(),
            occluder: occluder.into_ref(),
        }
    }

    /// Unlit, double-sided, pushed outward along the normals.
    #[inline]
    pub fn extrusion_material(&self) -> MaterialRef {
        self.extrusion.clone()
    }

    /// Unlit, back faces culled.
    #[inline]
    pub fn mask_material(&self) -> MaterialRef {
        self.mask.clone()
    }

    /// Unlit and double-sided, seen from inside.
    #[inline]
    pub fn occluder_material(&self) -> MaterialRef {
        self.occluder.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED};
    use crate::resource::Shading;
    use std::rc::Rc;

    #[test]
    fn test_default_overrides() {
        let bank = MaterialBank::new(&OutlineConfig::default());

        let extrusion = bank.extrusion_material();
        assert_eq!(extrusion.shading, Shading::Constant);
        assert_eq!(extrusion.color, BLUE);
        assert_eq!(extrusion.extrusion(), 0.1);
        assert_eq!(extrusion.cull_mode, CullMode::None);

        let mask = bank.mask_material();
        assert_eq!(mask.shading, Shading::Constant);
        assert_eq!(mask.color, RED);
        assert_eq!(mask.extrusion(), 0.0);
        assert_eq!(mask.cull_mode, CullMode::Back);
    }

    #[test]
    fn test_extrusion_follows_the_configured_magnitude() {
        let config = OutlineConfig::default().with_extrusion_magnitude(0.35);
        let bank = MaterialBank::new(&config);
        assert_eq!(bank.extrusion_material().extrusion(), 0.35);
        assert_eq!(bank.mask_material().extrusion(), 0.0);
    }

    #[test]
    fn test_overrides_are_singletons() {
        let bank = MaterialBank::new(&OutlineConfig::default());
        assert!(Rc::ptr_eq(&bank.mask_material(), &bank.mask_material()));
        assert!(Rc::ptr_eq(
            &bank.extrusion_material(),
            &bank.extrusion_material()
        ));
    }
}
