//! Renderer seam
//!
//! The scene never talks to a GPU API. Each frame it hands the constants of
//! every payload that changed to a [`FrameUploader`], which a backend
//! implements by copying them into its own buffers. These structures are
//! rendering primitives only: plain data with a fixed `#[repr(C)]` layout.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Mat4;
use crate::scene::{CameraHandle, GeometryHandle, Light, LightHandle, MaterialConstants, ObjectHandle};

/// Per-object constant buffer contents
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// Model matrix (column-major)
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix (column-major)
    pub normal: [[f32; 4]; 4],
}

impl ObjectConstants {
    /// Pack a model matrix and its normal matrix
    pub fn new(model: &Mat4, normal: &Mat4) -> Self {
        Self {
            model: (*model).into(),
            normal: (*normal).into(),
        }
    }
}

/// Per-light constant buffer contents
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightConstants {
    /// Light color
    pub color: [f32; 4],
    /// Authored direction, transformed by `matrix` in the shader
    pub direction: [f32; 4],
    /// Accumulated world matrix (column-major)
    pub matrix: [[f32; 4]; 4],
}

impl From<&Light> for LightConstants {
    fn from(light: &Light) -> Self {
        Self {
            color: light.color.into(),
            direction: light.direction.into(),
            matrix: (*light.matrix()).into(),
        }
    }
}

/// Backend sink for per-frame payload changes
///
/// `slot` is the object's position in material draw order, which is also its
/// offset in the backend's per-object constant array.
pub trait FrameUploader {
    /// Copy changed object constants
    fn upload_object(&mut self, slot: usize, object: ObjectHandle, constants: &ObjectConstants);

    /// Copy a material into the material table at `index`
    fn upload_material(&mut self, _index: usize, _constants: &MaterialConstants) {}

    /// Copy changed light constants
    fn upload_light(&mut self, _light: LightHandle, _constants: &LightConstants) {}

    /// Receive a recomputed camera view
    fn upload_camera(&mut self, _camera: CameraHandle, _view: &Mat4) {}

    /// Release geometry when the scene is torn down
    fn release_geometry(&mut self, _object: ObjectHandle, _geometry: GeometryHandle) {}
}

/// One call received by a [`RecordingUploader`]
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// `upload_object`
    Object {
        /// Draw order slot
        slot: usize,
        /// Source object
        handle: ObjectHandle,
        /// Uploaded constants
        constants: ObjectConstants,
    },
    /// `upload_material`
    Material {
        /// Material table index
        index: usize,
        /// Uploaded constants
        constants: MaterialConstants,
    },
    /// `upload_light`
    Light {
        /// Source light
        handle: LightHandle,
        /// Uploaded constants
        constants: LightConstants,
    },
    /// `upload_camera`
    Camera {
        /// Source camera
        handle: CameraHandle,
        /// New view matrix
        view: Mat4,
    },
    /// `release_geometry`
    Release {
        /// Source object
        handle: ObjectHandle,
        /// Released geometry
        geometry: GeometryHandle,
    },
}

/// Headless uploader that records every call
///
/// Stands in for a GPU backend when running without a window.
#[derive(Debug, Default)]
pub struct RecordingUploader {
    events: Vec<UploadEvent>,
}

impl RecordingUploader {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order
    pub fn events(&self) -> &[UploadEvent] {
        &self.events
    }

    /// Number of object uploads recorded
    pub fn object_uploads(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, UploadEvent::Object { .. })).count()
    }

    /// Number of material uploads recorded
    pub fn material_uploads(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, UploadEvent::Material { .. })).count()
    }

    /// Drain recorded calls
    pub fn take_events(&mut self) -> Vec<UploadEvent> {
        std::mem::take(&mut self.events)
    }
}

impl FrameUploader for RecordingUploader {
    fn upload_object(&mut self, slot: usize, object: ObjectHandle, constants: &ObjectConstants) {
        self.events.push(UploadEvent::Object { slot, handle: object, constants: *constants });
    }

    fn upload_material(&mut self, index: usize, constants: &MaterialConstants) {
        self.events.push(UploadEvent::Material { index, constants: *constants });
    }

    fn upload_light(&mut self, light: LightHandle, constants: &LightConstants) {
        self.events.push(UploadEvent::Light { handle: light, constants: *constants });
    }

    fn upload_camera(&mut self, camera: CameraHandle, view: &Mat4) {
        self.events.push(UploadEvent::Camera { handle: camera, view: *view });
    }

    fn release_geometry(&mut self, object: ObjectHandle, geometry: GeometryHandle) {
        self.events.push(UploadEvent::Release { handle: object, geometry });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, Vec4};

    #[test]
    fn test_constant_layouts() {
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 128);
        assert_eq!(std::mem::size_of::<LightConstants>(), 96);
    }

    #[test]
    fn test_light_constants_are_column_major() {
        let mut light = Light::new(Vec4::new(1.0, 0.5, 0.25, 1.0), Vec4::new(0.0, -1.0, 0.0, 0.0));
        crate::scene::LeafPayload::apply_transform(&mut light, &Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));

        let constants = LightConstants::from(&light);
        assert_eq!(constants.color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(constants.matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(bytemuck::cast_slice::<LightConstants, u8>(&[constants]).len(), 96);
    }
}
