//! Data structure of a scene object.

use crate::resource::{GpuMesh3d, MaterialRef};
use std::cell::RefCell;
use std::rc::Rc;

/// A renderable object: a shared mesh and the materials it is drawn with.
///
/// Only the first material is drawn. The list is kept whole so that a swap
/// can be undone by putting the same handles back.
#[derive(Clone)]
pub struct Object3d {
    mesh: Rc<RefCell<GpuMesh3d>>,
    materials: Vec<MaterialRef>,
}

impl Object3d {
    /// Creates a new object drawn with one material.
    pub fn new(mesh: Rc<RefCell<GpuMesh3d>>, material: MaterialRef) -> Object3d {
        Object3d {
            mesh,
            materials: vec![material],
        }
    }

    /// This object's mesh.
    #[inline]
    pub fn mesh(&self) -> &Rc<RefCell<GpuMesh3d>> {
        &self.mesh
    }

    /// The material drawn, if any.
    #[inline]
    pub fn material(&self) -> Option<&MaterialRef> {
        self.materials.first()
    }

    /// The whole material list.
    #[inline]
    pub fn materials(&self) -> &[MaterialRef] {
        &self.materials
    }

    /// Replaces the whole material list.
    #[inline]
    pub fn set_materials(&mut self, materials: Vec<MaterialRef>) {
        self.materials = materials;
    }

    /// Replaces the list by a single material.
    #[inline]
    pub fn set_material(&mut self, material: MaterialRef) {
        self.materials.clear();
        self.materials.push(material);
    }
}
