//! Leaf payload storage
//!
//! Objects, lights and cameras are owned by the scene in generational arenas.
//! The graph only stores handles to them inside container nodes, so a leaf can
//! be read by the renderer without walking the tree and a removed leaf turns
//! into a stale handle error instead of a dangling reference.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;

use super::camera::Camera;
use super::error::{PayloadKind, SceneError};
use super::light::Light;
use super::object::Object;

new_key_type! {
    /// Handle to an [`Object`] in a [`LeafStore`]
    pub struct ObjectHandle;
    /// Handle to a [`Light`] in a [`LeafStore`]
    pub struct LightHandle;
    /// Handle to a [`Camera`] in a [`LeafStore`]
    pub struct CameraHandle;
}

/// Receives the accumulated world matrix from a container
///
/// Called only when the container was reached with `dirty = true`.
pub trait LeafPayload {
    /// Consume the world matrix and flag the payload for re-upload
    fn apply_transform(&mut self, world_matrix: &Mat4);
}

/// What a container node holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Drawable object
    Object(ObjectHandle),
    /// Light source
    Light(LightHandle),
    /// Eye anchor of a camera
    CameraPosition(CameraHandle),
    /// Focus anchor of a camera
    CameraFocus(CameraHandle),
}

impl Payload {
    /// Variant tag
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Object(_) => PayloadKind::Object,
            Self::Light(_) => PayloadKind::Light,
            Self::CameraPosition(_) => PayloadKind::CameraPosition,
            Self::CameraFocus(_) => PayloadKind::CameraFocus,
        }
    }

    /// Deliver `world_matrix` to the payload this handle resolves to
    pub fn apply_transform(&self, world_matrix: &Mat4, leaves: &mut LeafStore) -> Result<(), SceneError> {
        let target: &mut dyn LeafPayload = match *self {
            Self::Object(handle) => leaves.object_mut(handle)?,
            Self::Light(handle) => leaves.light_mut(handle)?,
            Self::CameraPosition(handle) => leaves.camera_mut(handle)?.position_anchor_mut(),
            Self::CameraFocus(handle) => leaves.camera_mut(handle)?.focus_anchor_mut(),
        };
        target.apply_transform(world_matrix);
        Ok(())
    }
}

impl From<ObjectHandle> for Payload {
    fn from(handle: ObjectHandle) -> Self {
        Self::Object(handle)
    }
}

impl From<LightHandle> for Payload {
    fn from(handle: LightHandle) -> Self {
        Self::Light(handle)
    }
}

/// Arenas holding every leaf payload of a scene
#[derive(Debug, Default)]
pub struct LeafStore {
    objects: SlotMap<ObjectHandle, Object>,
    lights: SlotMap<LightHandle, Light>,
    cameras: SlotMap<CameraHandle, Camera>,
}

impl LeafStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object
    pub fn add_object(&mut self, object: Object) -> ObjectHandle {
        self.objects.insert(object)
    }

    /// Store a light
    pub fn add_light(&mut self, light: Light) -> LightHandle {
        self.lights.insert(light)
    }

    /// Store a camera
    pub fn add_camera(&mut self, camera: Camera) -> CameraHandle {
        self.cameras.insert(camera)
    }

    /// Remove an object; containers still pointing at it fail on their next dirty update
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Option<Object> {
        self.objects.remove(handle)
    }

    /// Look up an object
    pub fn object(&self, handle: ObjectHandle) -> Result<&Object, SceneError> {
        self.objects.get(handle).ok_or(SceneError::StalePayload(PayloadKind::Object))
    }

    /// Look up an object mutably
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut Object, SceneError> {
        self.objects.get_mut(handle).ok_or(SceneError::StalePayload(PayloadKind::Object))
    }

    /// Look up a light
    pub fn light(&self, handle: LightHandle) -> Result<&Light, SceneError> {
        self.lights.get(handle).ok_or(SceneError::StalePayload(PayloadKind::Light))
    }

    /// Look up a light mutably
    pub fn light_mut(&mut self, handle: LightHandle) -> Result<&mut Light, SceneError> {
        self.lights.get_mut(handle).ok_or(SceneError::StalePayload(PayloadKind::Light))
    }

    /// Look up a camera
    pub fn camera(&self, handle: CameraHandle) -> Result<&Camera, SceneError> {
        self.cameras.get(handle).ok_or(SceneError::StalePayload(PayloadKind::Camera))
    }

    /// Look up a camera mutably
    pub fn camera_mut(&mut self, handle: CameraHandle) -> Result<&mut Camera, SceneError> {
        self.cameras.get_mut(handle).ok_or(SceneError::StalePayload(PayloadKind::Camera))
    }

    /// All objects
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &Object)> {
        self.objects.iter()
    }

    /// All objects, mutably
    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectHandle, &mut Object)> {
        self.objects.iter_mut()
    }

    /// All lights
    pub fn lights(&self) -> impl Iterator<Item = (LightHandle, &Light)> {
        self.lights.iter()
    }

    /// All lights, mutably
    pub fn lights_mut(&mut self) -> impl Iterator<Item = (LightHandle, &mut Light)> {
        self.lights.iter_mut()
    }

    /// All cameras
    pub fn cameras(&self) -> impl Iterator<Item = (CameraHandle, &Camera)> {
        self.cameras.iter()
    }

    /// All cameras, mutably
    pub fn cameras_mut(&mut self) -> impl Iterator<Item = (CameraHandle, &mut Camera)> {
        self.cameras.iter_mut()
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Number of cameras
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Flag every object for re-upload
    pub fn mark_all_objects_dirty(&mut self) {
        for (_, object) in &mut self.objects {
            object.mark_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::object::GeometryHandle;

    #[test]
    fn test_payload_dispatch_reaches_camera_anchors() {
        let mut leaves = LeafStore::new();
        let camera = leaves.add_camera(Camera::default());
        leaves.camera_mut(camera).unwrap().update();

        let lift = Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0));
        Payload::CameraFocus(camera).apply_transform(&lift, &mut leaves).unwrap();

        let camera = leaves.camera(camera).unwrap();
        assert!(camera.focus_anchor().is_dirty());
        assert!(!camera.position_anchor().is_dirty());
        assert_eq!(camera.focus_anchor().world_point(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_removed_object_is_stale() {
        let mut leaves = LeafStore::new();
        let handle = leaves.add_object(Object::new(GeometryHandle(1), 0, 0));
        assert!(leaves.remove_object(handle).is_some());

        let result = Payload::from(handle).apply_transform(&Mat4::identity(), &mut leaves);
        assert_eq!(result, Err(SceneError::StalePayload(PayloadKind::Object)));
    }
}
