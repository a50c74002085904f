//! The directional light of the placed content.
//!
//! A light is attached to a scene node and inherits its world rotation. The
//! outline passes switch its shadow behavior per pass.

use crate::color::{self, Color};
use glamx::Vec3;

/// When shadows are resolved relative to the geometry that casts them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShadowMode {
    /// Shadows are drawn after all geometry, onto the receiving surfaces.
    #[default]
    Deferred,
    /// Shadows are drawn right after each caster.
    Forward,
}

/// A directional light with parallel rays.
///
/// # Examples
/// ```
/// # use xray3d::prelude::*;
/// let sun = Light::directional(Vec3::new(-1.0, -1.0, 0.0)).with_intensity(2.0);
/// assert!(sun.casts_shadow);
/// assert_eq!(sun.shadow_mode, ShadowMode::Deferred);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Light {
    /// Direction of the rays in the node's local space.
    pub direction: Vec3,
    /// RGBA color, each component in `[0, 1]`.
    pub color: Color,
    /// Multiplier of `color`.
    pub intensity: f32,
    /// Disabled lights are ignored by the renderer.
    pub enabled: bool,
    /// Whether shadows are projected from this light.
    pub casts_shadow: bool,
    /// How the shadows are resolved.
    pub shadow_mode: ShadowMode,
}

impl Default for Light {
    fn default() -> Self {
        Light::directional(Vec3::NEG_Y)
    }
}

impl Light {
    /// A white, shadow-casting light shining along `direction`.
    pub fn directional(direction: Vec3) -> Self {
        Light {
            direction,
            color: color::WHITE,
            intensity: 1.0,
            enabled: true,
            casts_shadow: true,
            shadow_mode: ShadowMode::Deferred,
        }
    }

    /// Sets the light intensity.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}
