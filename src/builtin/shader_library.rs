//! Named shader programs.
//!
//! Pipelines ask for programs by name. A name missing from the library is a
//! setup error, not a panic.

use crate::context::Context;
use crate::error::SetupError;

/// A WGSL module bundled with the crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderModuleId {
    /// Offscreen scene programs.
    Scene,
    /// Outline composite programs.
    OutlineComposite,
}

impl ShaderModuleId {
    /// Every bundled module.
    pub const ALL: [ShaderModuleId; 2] = [ShaderModuleId::Scene, ShaderModuleId::OutlineComposite];

    /// WGSL source of the module.
    pub fn source(self) -> &'static str {
        match self {
            ShaderModuleId::Scene => include_str!("scene.wgsl"),
            ShaderModuleId::OutlineComposite => include_str!("outline_composite.wgsl"),
        }
    }

    /// Debug label.
    pub fn label(self) -> &'static str {
        match self {
            ShaderModuleId::Scene => "scene_shader",
            ShaderModuleId::OutlineComposite => "outline_composite_shader",
        }
    }
}

/// A program: one entry point of a bundled module.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgramRef {
    /// Module holding the entry point.
    pub module: ShaderModuleId,
    /// Entry point name, which is also the program name.
    pub entry_point: &'static str,
}

const PROGRAMS: [ProgramRef; 6] = [
    ProgramRef {
        module: ShaderModuleId::Scene,
        entry_point: "scene_vertex",
    },
    ProgramRef {
        module: ShaderModuleId::Scene,
        entry_point: "extrusion_vertex",
    },
    ProgramRef {
        module: ShaderModuleId::Scene,
        entry_point: "lit_fragment",
    },
    ProgramRef {
        module: ShaderModuleId::Scene,
        entry_point: "flat_fragment",
    },
    ProgramRef {
        module: ShaderModuleId::OutlineComposite,
        entry_point: "quad_vertex",
    },
    ProgramRef {
        module: ShaderModuleId::OutlineComposite,
        entry_point: "quad_fragment",
    },
];

/// Looks up a program by name.
pub fn find_program(name: &str) -> Result<ProgramRef, SetupError> {
    PROGRAMS
        .iter()
        .copied()
        .find(|p| p.entry_point == name)
        .ok_or_else(|| SetupError::MissingShaderProgram {
            name: name.to_string(),
        })
}

/// The bundled modules, compiled on one device.
pub struct ShaderLibrary {
    scene: wgpu::ShaderModule,
    outline_composite: wgpu::ShaderModule,
}

impl ShaderLibrary {
    /// Compiles every bundled module.
    pub fn new(ctxt: &Context) -> Result<Self, SetupError> {
        let compile = |id: ShaderModuleId| ctxt.create_shader_module(id.label(), id.source());

        Ok(ShaderLibrary {
            scene: compile(ShaderModuleId::Scene)?,
            outline_composite: compile(ShaderModuleId::OutlineComposite)?,
        })
    }

    /// The compiled module and entry point of a named program.
    pub fn program(&self, name: &str) -> Result<(&wgpu::ShaderModule, &'static str), SetupError> {
        let program = find_program(name)?;
        let module = match program.module {
            ShaderModuleId::Scene => &self.scene,
            ShaderModuleId::OutlineComposite => &self.outline_composite,
        };
        Ok((module, program.entry_point))
    }
}
