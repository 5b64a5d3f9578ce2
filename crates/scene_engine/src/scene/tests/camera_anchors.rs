//! Camera anchors placed under independent transforms

use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::scene::{orbit, Camera, CameraHandle, LeafStore, OrbitInput, PayloadKind, SceneError, SceneGraph, TransformUpdate};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Rig {
        graph: SceneGraph,
        leaves: LeafStore,
        camera: CameraHandle,
        offset: Rc<Cell<Vec3>>,
    }

    /// Eye under a transform driven by `offset`, focus under a static lift
    fn rig() -> Rig {
        let mut leaves = LeafStore::new();
        let camera = leaves.add_camera(Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y()));
        let offset = Rc::new(Cell::new(Vec3::new(1.0, 0.0, 0.0)));

        let mut graph = SceneGraph::new();
        let fan = graph.at_root().branch().unwrap().handle();

        let input = Rc::clone(&offset);
        let mut applied = None;
        graph
            .at(fan)
            .transform_fn(move |matrix, _, _| {
                let current = input.get();
                if applied == Some(current) {
                    return TransformUpdate::Unchanged;
                }
                applied = Some(current);
                *matrix = Mat4::new_translation(&current);
                TransformUpdate::Changed(*matrix)
            })
            .unwrap()
            .insert(crate::scene::Payload::CameraPosition(camera))
            .unwrap();

        graph
            .at(fan)
            .transform_matrix(Mat4::new_translation(&Vec3::new(0.0, 2.0, 0.0)))
            .unwrap()
            .insert(crate::scene::Payload::CameraFocus(camera))
            .unwrap();

        Rig { graph, leaves, camera, offset }
    }

    fn frame(rig: &mut Rig, dirty: bool) {
        rig.graph.update(0.016, &Mat4::identity(), dirty, &mut rig.leaves).unwrap();
        rig.leaves.camera_mut(rig.camera).unwrap().update();
    }

    #[test]
    fn test_view_reflects_both_transforms_after_build() {
        let mut rig = rig();
        frame(&mut rig, true);

        let camera = rig.leaves.camera(rig.camera).unwrap();
        let eye = Vec3::new(1.0, 0.0, 5.0);
        let focus = Vec3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(camera.eye_position().unwrap(), eye, epsilon = 1e-6);
        assert_relative_eq!(camera.focus_point().unwrap(), focus, epsilon = 1e-6);
        assert_relative_eq!(*camera.view_matrix().unwrap(), Mat4::look_at(eye, focus, Vec3::y()), epsilon = 1e-6);
    }

    #[test]
    fn test_moving_eye_leaves_focus_untouched() {
        let mut rig = rig();
        frame(&mut rig, true);

        rig.offset.set(Vec3::new(-3.0, 1.0, 0.0));
        rig.graph.update(0.016, &Mat4::identity(), false, &mut rig.leaves).unwrap();

        let camera = rig.leaves.camera(rig.camera).unwrap();
        assert!(camera.position_anchor().is_dirty());
        assert!(!camera.focus_anchor().is_dirty());
        assert_eq!(camera.view_matrix(), Err(SceneError::CameraAnchorDirty(PayloadKind::CameraPosition)));

        rig.leaves.camera_mut(rig.camera).unwrap().update();
        let camera = rig.leaves.camera(rig.camera).unwrap();
        let eye = Vec3::new(-3.0, 1.0, 5.0);
        let focus = Vec3::new(0.0, 2.0, 0.0);
        assert_relative_eq!(camera.focus_point().unwrap(), focus, epsilon = 1e-6);
        assert_relative_eq!(*camera.view_matrix().unwrap(), Mat4::look_at(eye, focus, Vec3::y()), epsilon = 1e-6);
    }

    #[test]
    fn test_idle_frames_keep_camera_clean() {
        let mut rig = rig();
        frame(&mut rig, true);

        rig.graph.update(0.016, &Mat4::identity(), false, &mut rig.leaves).unwrap();
        let camera = rig.leaves.camera_mut(rig.camera).unwrap();
        assert!(!camera.is_dirty());
        assert!(!camera.update());
    }

    #[test]
    fn test_orbit_swings_eye_around_focus() {
        let mut leaves = LeafStore::new();
        let camera = leaves.add_camera(Camera::new(Vec3::new(0.0, 0.0, 4.0), Vec3::zeros(), Vec3::y()));
        let input = Rc::new(Cell::new(OrbitInput::default()));

        let mut graph = SceneGraph::new();
        graph
            .at_root()
            .transform_fn(orbit(Rc::clone(&input)))
            .unwrap()
            .insert(crate::scene::Payload::CameraPosition(camera))
            .unwrap();
        graph.at_root().insert(crate::scene::Payload::CameraFocus(camera)).unwrap();

        graph.update(0.0, &Mat4::identity(), true, &mut leaves).unwrap();
        leaves.camera_mut(camera).unwrap().update();

        input.set(OrbitInput { yaw: crate::foundation::math::constants::HALF_PI, ..OrbitInput::default() });
        graph.update(0.016, &Mat4::identity(), false, &mut leaves).unwrap();
        let camera = leaves.camera_mut(camera).unwrap();
        assert!(camera.update());

        assert_relative_eq!(camera.eye_position().unwrap(), Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.focus_point().unwrap(), Vec3::zeros(), epsilon = 1e-6);
    }
}
