//! Light sources

use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::leaves::LeafPayload;

/// Directional light placed by the scene graph
///
/// `color` and `direction` are authored values. The accumulated world matrix
/// is written only by the light's container; the renderer applies it to the
/// direction at shading time (or through [`Light::world_direction`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light color (RGBA)
    pub color: Vec4,
    /// Authored direction (w = 0)
    pub direction: Vec4,
    matrix: Mat4,
    dirty: bool,
}

impl Light {
    /// Create a light with an identity matrix
    pub fn new(color: Vec4, direction: Vec4) -> Self {
        Self {
            color,
            direction,
            matrix: Mat4::identity(),
            dirty: true,
        }
    }

    /// Create a white light pointing along `direction`
    pub fn directional(direction: Vec3) -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 1.0), direction.normalize().push(0.0))
    }

    /// Builder pattern: set color
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Accumulated world matrix from the last dirty traversal
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Direction with the world matrix applied, normalized
    pub fn world_direction(&self) -> Vec3 {
        let direction = (self.matrix * self.direction).xyz();
        direction.try_normalize(f32::EPSILON).unwrap_or(direction)
    }

    /// Whether the matrix changed since last consumed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the light constants as consumed
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl LeafPayload for Light {
    fn apply_transform(&mut self, world_matrix: &Mat4) {
        self.matrix = *world_matrix;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants, Mat4Ext};
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_transform_replaces_matrix() {
        let mut light = Light::directional(Vec3::new(0.0, 0.0, -1.0));
        light.clear_dirty();

        let world = Mat4::rotation_y(constants::HALF_PI);
        light.apply_transform(&world);

        assert!(light.is_dirty());
        assert_eq!(*light.matrix(), world);
        // Authored direction is never rewritten
        assert_eq!(light.direction, Vec4::new(0.0, 0.0, -1.0, 0.0));
    }

    #[test]
    fn test_world_direction_ignores_translation() {
        let mut light = Light::directional(Vec3::new(0.0, 0.0, -1.0));
        let world = Mat4::new_translation(&Vec3::new(5.0, 5.0, 5.0)) * Mat4::rotation_y(constants::HALF_PI);
        light.apply_transform(&world);

        let direction = light.world_direction();
        assert_relative_eq!(direction, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }
}
