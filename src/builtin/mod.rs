//! Built-in shaders and materials.

pub use self::material_bank::MaterialBank;
pub use self::shader_library::{find_program, ProgramRef, ShaderLibrary, ShaderModuleId};

mod material_bank;
mod shader_library;
