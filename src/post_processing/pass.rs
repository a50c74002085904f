//! The outline passes and the scene state each of them requires.

use crate::light::ShadowMode;
use std::fmt;

/// One of the offscreen renders making up an outline frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pass {
    /// The scene with its own materials. Initial and terminal state of every frame.
    #[default]
    FullRender,
    /// The target object pushed along its normals, flat extrusion color.
    OutlineExtrusion,
    /// The target object as-is, flat mask color.
    OutlineMask,
}

impl Pass {
    /// The order passes run in within one frame.
    pub const SEQUENCE: [Pass; 3] = [Pass::FullRender, Pass::OutlineExtrusion, Pass::OutlineMask];

    /// Short name, used in labels and logs.
    pub fn label(self) -> &'static str {
        match self {
            Pass::FullRender => "full",
            Pass::OutlineExtrusion => "extrusion",
            Pass::OutlineMask => "mask",
        }
    }

    /// Texture binding slot of this pass's target in the composite program.
    pub fn texture_slot(self) -> u32 {
        match self {
            Pass::FullRender => 0,
            Pass::OutlineExtrusion => 1,
            Pass::OutlineMask => 2,
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which material list the target object carries during a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaterialSelection {
    /// The object's own materials, as captured on the first full render.
    Original,
    /// The extrusion override alone.
    Extrusion,
    /// The mask override alone.
    Mask,
}

/// Light configuration during a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightMode {
    /// How shadows are resolved.
    pub shadow_mode: ShadowMode,
    /// Whether the light casts shadows.
    pub casts_shadow: bool,
}

/// Scene-graph state the bridge applies before a pass is rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PassState {
    /// Visibility of the target object.
    pub object_visible: bool,
    /// Whether the target object casts shadows.
    pub object_casts_shadow: bool,
    /// Visibility of the shadow-catcher plane.
    pub shadow_plane_visible: bool,
    /// Light configuration.
    pub light: LightMode,
    /// Material list of the target object.
    pub materials: MaterialSelection,
    /// Whether the background occluder surrounds the viewpoint (direct variant only).
    pub occluder: bool,
}

impl PassState {
    /// The state table.
    pub fn for_pass(pass: Pass) -> PassState {
        let outline = PassState {
            object_visible: true,
            object_casts_shadow: false,
            shadow_plane_visible: false,
            light: LightMode {
                shadow_mode: ShadowMode::Forward,
                casts_shadow: false,
            },
            materials: MaterialSelection::Mask,
            occluder: false,
        };

        match pass {
            Pass::FullRender => PassState {
                object_visible: true,
                object_casts_shadow: true,
                shadow_plane_visible: true,
                light: LightMode {
                    shadow_mode: ShadowMode::Deferred,
                    casts_shadow: true,
                },
                materials: MaterialSelection::Original,
                occluder: false,
            },
            Pass::OutlineExtrusion => PassState {
                materials: MaterialSelection::Extrusion,
                occluder: true,
                ..outline
            },
            Pass::OutlineMask => outline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Pass::FullRender, true, MaterialSelection::Original)]
    #[case(Pass::OutlineExtrusion, false, MaterialSelection::Extrusion)]
    #[case(Pass::OutlineMask, false, MaterialSelection::Mask)]
    fn test_state_table(
        #[case] pass: Pass,
        #[case] shadows: bool,
        #[case] materials: MaterialSelection,
    ) {
        let state = PassState::for_pass(pass);
        assert!(state.object_visible);
        assert_eq!(state.object_casts_shadow, shadows);
        assert_eq!(state.shadow_plane_visible, shadows);
        assert_eq!(state.light.casts_shadow, shadows);
        assert_eq!(state.materials, materials);
    }

    #[test]
    fn test_only_extrusion_uses_the_occluder() {
        let occluded: Vec<_> = Pass::SEQUENCE
            .into_iter()
            .filter(|p| PassState::for_pass(*p).occluder)
            .collect();
        assert_eq!(occluded, vec![Pass::OutlineExtrusion]);
    }

    #[test]
    fn test_sequence_starts_with_full_render() {
        assert_eq!(Pass::SEQUENCE[0], Pass::default());
        let slots: Vec<u32> = Pass::SEQUENCE.iter().map(|p| p.texture_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
