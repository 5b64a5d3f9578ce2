//! Surface materials indexed by objects

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec4;

/// Phong material parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient reflectance
    pub ambient: Vec4,
    /// Diffuse reflectance
    pub diffuse: Vec4,
    /// Specular reflectance
    pub specular: Vec4,
    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Create a material from its reflectance terms
    pub fn new(ambient: Vec4, diffuse: Vec4, specular: Vec4, shininess: f32) -> Self {
        Self { ambient, diffuse, specular, shininess }
    }

    /// Ruby preset
    pub fn ruby() -> Self {
        Self::new(
            Vec4::new(0.1745, 0.011_75, 0.011_75, 1.0),
            Vec4::new(0.614_24, 0.041_36, 0.041_36, 1.0),
            Vec4::new(0.727_811, 0.626_959, 0.626_959, 1.0),
            0.6,
        )
    }

    /// Pearl preset
    pub fn pearl() -> Self {
        Self::new(
            Vec4::new(0.25, 0.207_25, 0.207_25, 1.0),
            Vec4::new(1.0, 0.829, 0.829, 1.0),
            Vec4::new(0.296_648, 0.296_648, 0.296_648, 1.0),
            0.088,
        )
    }

    /// Shader-ready layout
    pub fn constants(&self) -> MaterialConstants {
        MaterialConstants {
            ambient: self.ambient.into(),
            diffuse: self.diffuse.into(),
            specular: self.specular.into(),
            shininess: self.shininess,
            _padding: [0.0; 3],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(
            Vec4::new(0.1, 0.1, 0.1, 1.0),
            Vec4::new(0.8, 0.8, 0.8, 1.0),
            Vec4::new(0.5, 0.5, 0.5, 1.0),
            32.0,
        )
    }
}

/// Material constants padded to 16-byte rows
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Ambient reflectance
    pub ambient: [f32; 4],
    /// Diffuse reflectance
    pub diffuse: [f32; 4],
    /// Specular reflectance
    pub specular: [f32; 4],
    /// Specular exponent
    pub shininess: f32,
    _padding: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_constants_layout() {
        assert_eq!(std::mem::size_of::<MaterialConstants>(), 64);

        let constants = Material::pearl().constants();
        assert_eq!(constants.diffuse, [1.0, 0.829, 0.829, 1.0]);
        assert_eq!(constants.shininess, 0.088);
        assert_eq!(bytemuck::bytes_of(&constants).len(), 64);
    }
}
