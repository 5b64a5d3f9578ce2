//! Scene: graph plus the payloads it places
//!
//! [`Scene`] owns the node graph, the leaf arenas and the material table, and
//! runs the per-frame sequence a renderer expects:
//!
//! 1. propagate transforms from the root (forced dirty on the first frame)
//! 2. upload materials added since the last frame
//! 3. upload constants of every dirty object, in material draw order
//! 4. upload dirty lights
//! 5. let each camera rebuild its view from its anchors
//!
//! Step 5 must follow step 1 in the same frame; reading a camera between the
//! two is a sequencing error reported by [`Camera::view_matrix`].

use crate::foundation::math::Mat4;
use crate::render::{FrameUploader, LightConstants};

use super::camera::Camera;
use super::error::SceneError;
use super::graph::SceneGraph;
use super::leaves::{CameraHandle, LeafStore, LightHandle, ObjectHandle};
use super::light::Light;
use super::material::Material;
use super::object::Object;

/// What one frame pushed to the uploader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Materials uploaded into the material table
    pub materials_uploaded: usize,
    /// Objects whose constants were uploaded
    pub objects_uploaded: usize,
    /// Lights whose constants were uploaded
    pub lights_uploaded: usize,
    /// Cameras whose view was rebuilt
    pub cameras_updated: usize,
}

impl FrameReport {
    /// Whether anything changed this frame
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Complete scene state
#[derive(Debug, Default)]
pub struct Scene {
    graph: SceneGraph,
    leaves: LeafStore,
    materials: Vec<Material>,
    materials_uploaded: usize,
    draw_order: Vec<ObjectHandle>,
    draw_order_stale: bool,
    synced_revision: u64,
    initialized: bool,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Node graph
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Node graph, mutably, for building
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Leaf arenas
    pub fn leaves(&self) -> &LeafStore {
        &self.leaves
    }

    /// Leaf arenas, mutably
    pub fn leaves_mut(&mut self) -> &mut LeafStore {
        &mut self.leaves
    }

    /// Graph and leaves borrowed together
    pub fn parts_mut(&mut self) -> (&mut SceneGraph, &mut LeafStore) {
        (&mut self.graph, &mut self.leaves)
    }

    /// Append a material and return its index
    ///
    /// The material reaches the uploader on the next frame.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Material table
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Store an object; it is placed in draw order on the next frame
    pub fn add_object(&mut self, object: Object) -> ObjectHandle {
        self.draw_order_stale = true;
        self.leaves.add_object(object)
    }

    /// Store a light
    pub fn add_light(&mut self, light: Light) -> LightHandle {
        self.leaves.add_light(light)
    }

    /// Store a camera
    pub fn add_camera(&mut self, camera: Camera) -> CameraHandle {
        self.leaves.add_camera(camera)
    }

    /// Look up a camera
    pub fn camera(&self, handle: CameraHandle) -> Result<&Camera, SceneError> {
        self.leaves.camera(handle)
    }

    /// Objects in draw order; an object's position is its constant buffer slot
    pub fn draw_order(&self) -> &[ObjectHandle] {
        &self.draw_order
    }

    /// Whether the forced first pass has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Group objects by material so each material is bound once per frame
    ///
    /// Slots move, so every object is flagged for re-upload.
    pub fn sort_by_material(&mut self) {
        let leaves = &self.leaves;
        self.draw_order = leaves.objects().map(|(handle, _)| handle).collect();
        self.draw_order.sort_by_key(|&handle| {
            leaves.object(handle).map_or(usize::MAX, Object::material_index)
        });
        self.leaves.mark_all_objects_dirty();
        self.draw_order_stale = false;
        log::debug!("Sorted {} objects by material", self.draw_order.len());
    }

    /// Run the forced first pass so every payload receives a world matrix
    pub fn initialize(&mut self) -> Result<(), SceneError> {
        self.sort_by_material();
        self.graph.update(0.0, &Mat4::identity(), true, &mut self.leaves)?;
        self.synced_revision = self.graph.revision();
        self.initialized = true;
        log::info!(
            "Scene initialized: {} nodes, {} objects, {} lights, {} cameras",
            self.graph.len(),
            self.leaves.object_count(),
            self.leaves.light_count(),
            self.leaves.camera_count()
        );
        Ok(())
    }

    /// Advance one frame and push every change to `uploader`
    ///
    /// Initializes the scene first if that has not happened yet. A frame that
    /// follows structural edits to the graph runs as a forced dirty pass so the
    /// new nodes receive their world matrices.
    pub fn update(&mut self, delta_time: f32, uploader: &mut dyn FrameUploader) -> Result<FrameReport, SceneError> {
        if self.initialized {
            if self.draw_order_stale {
                self.sort_by_material();
            }

            let structure_changed = self.graph.revision() != self.synced_revision;
            if structure_changed {
                log::debug!("Graph structure changed, forcing a dirty pass");
            }
            self.graph.update(delta_time, &Mat4::identity(), structure_changed, &mut self.leaves)?;
            self.synced_revision = self.graph.revision();
        } else {
            self.initialize()?;
        }

        let mut report = FrameReport::default();

        for (index, material) in self.materials.iter().enumerate().skip(self.materials_uploaded) {
            uploader.upload_material(index, &material.constants());
            report.materials_uploaded += 1;
        }
        self.materials_uploaded = self.materials.len();

        for (slot, &handle) in self.draw_order.iter().enumerate() {
            let object = self.leaves.object_mut(handle)?;
            if object.is_dirty() {
                uploader.upload_object(slot, handle, &object.constants());
                object.clear_dirty();
                report.objects_uploaded += 1;
            }
        }

        for (handle, light) in self.leaves.lights_mut() {
            if light.is_dirty() {
                uploader.upload_light(handle, &LightConstants::from(&*light));
                light.clear_dirty();
                report.lights_uploaded += 1;
            }
        }

        for (handle, camera) in self.leaves.cameras_mut() {
            if camera.update() {
                uploader.upload_camera(handle, camera.view_matrix()?);
                report.cameras_updated += 1;
            }
        }

        log::trace!("Frame report: {:?}", report);
        Ok(report)
    }

    /// Release renderer resources held by objects and empty the scene
    pub fn teardown(&mut self, uploader: &mut dyn FrameUploader) {
        for (handle, object) in self.leaves.objects() {
            uploader.release_geometry(handle, object.geometry());
        }
        log::info!("Scene torn down ({} objects released)", self.leaves.object_count());
        *self = Self::new();
    }
}
