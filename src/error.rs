//! Error types.
//!
//! Setup failures and per-frame misses are kept apart: a [`SetupError`] means no
//! effect can be built at all, while a [`FrameMiss`] only means this frame gets
//! no outline and the next one tries again.

use std::fmt;
use thiserror::Error;

/// Unrecoverable failure while building the outline effect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// No adapter or device could be obtained.
    #[error("no compatible graphics device is available")]
    NoCompatibleDevice,

    /// A program name was looked up that the shader library does not provide.
    #[error("shader program `{name}` is not in the library")]
    MissingShaderProgram {
        /// Name that was requested.
        name: String,
    },

    /// wgpu rejected a shader module or pipeline.
    #[error("pipeline `{label}` failed to compile: {message}")]
    PipelineCompilation {
        /// Debug label of the failing object.
        label: String,
        /// Validation message reported by wgpu.
        message: String,
    },

    /// The view has a zero-sized drawable area.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport {
        /// Drawable width in device pixels.
        width: u32,
        /// Drawable height in device pixels.
        height: u32,
    },

    /// The color format cannot be rendered to and sampled from.
    #[error("color format {0:?} cannot be used as a render target")]
    UnsupportedFormat(wgpu::TextureFormat),
}

/// Scene-graph role of a node the bridge needs to find.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// The outlined mesh node.
    Mesh,
    /// The node holding the outlined mesh, moved to the anchor every tick.
    Container,
    /// The shadow-catcher plane paired with the mesh.
    ShadowPlane,
    /// The directional light of the placed content.
    Light,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeRole::Mesh => "mesh",
            NodeRole::Container => "mesh container",
            NodeRole::ShadowPlane => "shadow plane",
            NodeRole::Light => "directional light",
        };
        f.write_str(name)
    }
}

/// Recoverable reason for skipping the post-process step of one frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMiss {
    /// The host has no open frame to composite into.
    #[error("the host render pass is unavailable")]
    HostPassUnavailable,

    /// A node the outline depends on is not in the scene graph.
    #[error("{0} not found in the scene graph")]
    TargetNotFound(NodeRole),

    /// No anchor has been placed or the tracker lost it.
    #[error("the placement anchor is not tracked")]
    AnchorUnavailable,

    /// The render targets could not be bound.
    #[error("render targets are unavailable")]
    TargetsUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_messages_name_the_role() {
        let miss = FrameMiss::TargetNotFound(NodeRole::ShadowPlane);
        assert_eq!(miss.to_string(), "shadow plane not found in the scene graph");
    }

    #[test]
    fn test_setup_error_messages() {
        let err = SetupError::MissingShaderProgram {
            name: "quad_fragment".to_string(),
        };
        assert_eq!(err.to_string(), "shader program `quad_fragment` is not in the library");

        let err = SetupError::InvalidViewport {
            width: 0,
            height: 768,
        };
        assert_eq!(err.to_string(), "invalid viewport 0x768");
    }
}
