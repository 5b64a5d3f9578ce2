//! Drawable objects
//!
//! An [`Object`] is the renderer-facing half of a mesh instance: it carries the
//! world matrix written by its container during traversal and a "dirty since
//! last consumed" flag that tells the renderer the per-object constants need
//! re-uploading.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::ObjectConstants;

use super::leaves::LeafPayload;

/// Opaque handle to GPU geometry owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Drawable object placed by the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    world_matrix: Mat4,
    dirty: bool,
    material_index: usize,
    texture_index: usize,
    geometry: GeometryHandle,
}

impl Object {
    /// Create an object at the origin
    ///
    /// New objects start dirty so their constants are uploaded at least once.
    pub fn new(geometry: GeometryHandle, material_index: usize, texture_index: usize) -> Self {
        Self {
            world_matrix: Mat4::identity(),
            dirty: true,
            material_index,
            texture_index,
            geometry,
        }
    }

    /// Replace the world matrix
    pub fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    /// Flag the constants as needing re-upload
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the constants need re-upload
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the constants as consumed
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// World matrix from the last dirty traversal
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Inverse-transpose of the world matrix for transforming normals
    pub fn normal_matrix(&self) -> Mat4 {
        self.world_matrix.normal_matrix()
    }

    /// Material slot
    pub fn material_index(&self) -> usize {
        self.material_index
    }

    /// Texture slot
    pub fn texture_index(&self) -> usize {
        self.texture_index
    }

    /// Renderer geometry
    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    /// Per-object constants ready for upload
    pub fn constants(&self) -> ObjectConstants {
        ObjectConstants::new(&self.world_matrix, &self.normal_matrix())
    }
}

impl LeafPayload for Object {
    fn apply_transform(&mut self, world_matrix: &Mat4) {
        self.set_world_matrix(*world_matrix);
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_object_is_dirty_at_origin() {
        let object = Object::new(GeometryHandle(7), 1, 0);
        assert!(object.is_dirty());
        assert_eq!(*object.world_matrix(), Mat4::identity());
        assert_eq!(object.geometry(), GeometryHandle(7));
        assert_eq!(object.material_index(), 1);
        assert_eq!(object.texture_index(), 0);
    }

    #[test]
    fn test_apply_transform_sets_matrix_and_dirty() {
        let mut object = Object::new(GeometryHandle(0), 0, 0);
        object.clear_dirty();

        let world = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        object.apply_transform(&world);

        assert!(object.is_dirty());
        assert_eq!(*object.world_matrix(), world);
    }

    #[test]
    fn test_constants_carry_model_and_normal_matrix() {
        let mut object = Object::new(GeometryHandle(0), 0, 0);
        let world = Mat4::new_translation(&Vec3::new(4.0, 0.0, 0.0)) * Mat4::new_scaling(2.0);
        object.set_world_matrix(world);

        let constants = object.constants();
        let model: [[f32; 4]; 4] = world.into();
        assert_eq!(constants.model, model);
        // Translation never leaks into the normal matrix
        assert_relative_eq!(constants.normal[3][0], 0.0);
        assert_relative_eq!(constants.normal[0][0], 0.5, epsilon = 1e-6);
    }
}
