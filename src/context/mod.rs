//! wgpu device context.

pub use self::context::Context;

#[allow(clippy::module_inception)]
mod context;
