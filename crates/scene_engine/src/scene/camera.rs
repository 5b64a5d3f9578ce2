//! Camera driven by two scene graph anchors
//!
//! A camera does not live at one place in the tree. Its eye position and its
//! focus point are two independent leaves ([`CameraPositionAnchor`] and
//! [`CameraFocusAnchor`]) that can be placed under different transforms: an
//! orbiting position above a static focus, a focus that follows an animated
//! object, and so on. The view matrix is rebuilt lazily from the two anchors'
//! world translations whenever either one was touched by a dirty traversal.

use std::marker::PhantomData;

use crate::core::config::CameraConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

use super::error::{PayloadKind, SceneError};
use super::leaves::LeafPayload;

/// Distinguishes the two anchor roles at the type level
pub trait AnchorRole {
    /// Payload kind reported in errors
    const KIND: PayloadKind;
}

/// Role marker for the eye position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRole;

/// Role marker for the focus point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRole;

impl AnchorRole for PositionRole {
    const KIND: PayloadKind = PayloadKind::CameraPosition;
}

impl AnchorRole for FocusRole {
    const KIND: PayloadKind = PayloadKind::CameraFocus;
}

/// A point owned by a camera and placed by the scene graph
///
/// `base` is the authored translation. The composed matrix is the world matrix
/// delivered by the anchor's container multiplied by `base`; its translation
/// column is the anchor's world position.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor<R> {
    base: Mat4,
    incoming: Mat4,
    composed: Mat4,
    dirty: bool,
    _role: PhantomData<R>,
}

/// Anchor for the camera eye
pub type CameraPositionAnchor = Anchor<PositionRole>;

/// Anchor for the point the camera looks at
pub type CameraFocusAnchor = Anchor<FocusRole>;

impl<R: AnchorRole> Anchor<R> {
    /// Create a dirty anchor at `point`
    pub fn at(point: Vec3) -> Self {
        let base = Mat4::new_translation(&point);
        Self {
            base,
            incoming: Mat4::identity(),
            composed: base,
            dirty: true,
            _role: PhantomData,
        }
    }

    /// Authored translation
    pub fn base_matrix(&self) -> &Mat4 {
        &self.base
    }

    /// Graph world matrix composed with the authored translation
    pub fn composed_matrix(&self) -> &Mat4 {
        &self.composed
    }

    /// World position of the anchor
    pub fn world_point(&self) -> Vec3 {
        self.composed.translation_part()
    }

    /// Whether the camera has yet to consume a change to this anchor
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move the authored point, keeping the last graph world matrix
    ///
    /// Unlike a plain reset to the base matrix, the anchor stays where the
    /// graph placed it until the next dirty pass recomposes it.
    pub fn set_point(&mut self, point: Vec3) {
        self.base = Mat4::new_translation(&point);
        self.composed = self.incoming * self.base;
        self.dirty = true;
    }

    fn ensure_clean(&self) -> Result<(), SceneError> {
        if self.dirty {
            Err(SceneError::CameraAnchorDirty(R::KIND))
        } else {
            Ok(())
        }
    }
}

impl<R: AnchorRole> LeafPayload for Anchor<R> {
    fn apply_transform(&mut self, world_matrix: &Mat4) {
        self.incoming = *world_matrix;
        self.composed = world_matrix * self.base;
        self.dirty = true;
    }
}

/// Look-at camera assembled from two anchors
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: CameraPositionAnchor,
    focus: CameraFocusAnchor,
    up: Vec3,
    view: Mat4,
}

impl Camera {
    /// Create a camera; the view is built on the first [`Camera::update`]
    pub fn new(position: Vec3, focus: Vec3, up: Vec3) -> Self {
        Self {
            position: CameraPositionAnchor::at(position),
            focus: CameraFocusAnchor::at(focus),
            up,
            view: Mat4::identity(),
        }
    }

    /// Create a camera from its configuration section
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position, config.focus, config.up)
    }

    /// Eye anchor
    pub fn position_anchor(&self) -> &CameraPositionAnchor {
        &self.position
    }

    /// Eye anchor, mutably
    pub fn position_anchor_mut(&mut self) -> &mut CameraPositionAnchor {
        &mut self.position
    }

    /// Focus anchor
    pub fn focus_anchor(&self) -> &CameraFocusAnchor {
        &self.focus
    }

    /// Focus anchor, mutably
    pub fn focus_anchor_mut(&mut self) -> &mut CameraFocusAnchor {
        &mut self.focus
    }

    /// Fixed up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Whether either anchor changed since the last update
    pub fn is_dirty(&self) -> bool {
        self.position.is_dirty() || self.focus.is_dirty()
    }

    /// Rebuild the view matrix if an anchor changed
    ///
    /// Returns `true` when the view was recomputed. Both anchors are clean
    /// afterwards.
    pub fn update(&mut self) -> bool {
        if !self.is_dirty() {
            return false;
        }

        self.rebuild_view();
        self.position.dirty = false;
        self.focus.dirty = false;
        true
    }

    /// Current view matrix
    ///
    /// Reading the view while an anchor is dirty is a sequencing error: the
    /// caller skipped [`Camera::update`] after a traversal.
    pub fn view_matrix(&self) -> Result<&Mat4, SceneError> {
        self.position.ensure_clean()?;
        self.focus.ensure_clean()?;
        Ok(&self.view)
    }

    /// World position of the eye as of the last update
    pub fn eye_position(&self) -> Result<Vec3, SceneError> {
        self.position.ensure_clean()?;
        Ok(self.position.world_point())
    }

    /// World position of the focus point as of the last update
    pub fn focus_point(&self) -> Result<Vec3, SceneError> {
        self.focus.ensure_clean()?;
        Ok(self.focus.world_point())
    }

    /// Move the authored eye position
    pub fn set_position(&mut self, position: Vec3) {
        self.position.set_point(position);
    }

    /// Move the authored focus point
    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus.set_point(focus);
    }

    /// Replace the up vector
    ///
    /// Applied immediately when the anchors are clean, otherwise on the next
    /// update together with the anchor changes.
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        if !self.is_dirty() {
            self.rebuild_view();
        }
    }

    fn rebuild_view(&mut self) {
        let eye = self.position.world_point();
        let target = self.focus.world_point();

        // look_at is undefined when the eye sits on the focus or looks along up
        let forward = target - eye;
        let scale = forward.norm() * self.up.norm();
        if scale <= f32::EPSILON || forward.cross(&self.up).norm() <= f32::EPSILON * scale {
            log::warn!(
                "Degenerate camera basis (eye {:?}, focus {:?}, up {:?}); keeping previous view",
                eye, target, self.up
            );
            return;
        }

        self.view = Mat4::look_at(eye, target, self.up);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_read_before_update_fails() {
        let camera = Camera::default();
        assert_eq!(
            camera.view_matrix(),
            Err(SceneError::CameraAnchorDirty(PayloadKind::CameraPosition))
        );
    }

    #[test]
    fn test_update_builds_look_at() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::zeros(), Vec3::y());
        assert!(camera.update());
        assert!(!camera.update());

        let expected = Mat4::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::zeros(), Vec3::y());
        assert_relative_eq!(*camera.view_matrix().unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_anchor_composes_world_with_base() {
        let mut anchor = CameraPositionAnchor::at(Vec3::new(0.0, 0.0, 3.0));
        anchor.apply_transform(&Mat4::rotation_y(constants::HALF_PI));

        assert!(anchor.is_dirty());
        assert_relative_eq!(anchor.world_point(), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_only_dirty_focus_is_reported() {
        let mut camera = Camera::default();
        camera.update();
        camera.focus_anchor_mut().apply_transform(&Mat4::identity());

        assert_eq!(
            camera.view_matrix(),
            Err(SceneError::CameraAnchorDirty(PayloadKind::CameraFocus))
        );
        assert!(camera.eye_position().is_ok());
    }

    #[test]
    fn test_set_position_keeps_graph_transform() {
        let mut camera = Camera::default();
        let lift = Mat4::new_translation(&Vec3::new(0.0, 2.0, 0.0));
        camera.position_anchor_mut().apply_transform(&lift);
        camera.update();

        camera.set_position(Vec3::new(0.0, 0.0, 5.0));
        assert!(camera.is_dirty());
        camera.update();

        assert_relative_eq!(camera.eye_position().unwrap(), Vec3::new(0.0, 2.0, 5.0), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_basis_keeps_previous_view() {
        let mut camera = Camera::default();
        camera.update();
        let before = *camera.view_matrix().unwrap();

        camera.set_focus(Vec3::new(0.0, 0.0, 3.0));
        camera.update();
        assert_eq!(*camera.view_matrix().unwrap(), before);
    }

    #[test]
    fn test_near_parallel_up_is_degenerate() {
        let mut camera = Camera::default();
        camera.update();
        let before = *camera.view_matrix().unwrap();

        camera.set_up(Vec3::new(0.0, 1.0e-7, 1.0));
        assert_eq!(*camera.view_matrix().unwrap(), before);
    }

    #[test]
    fn test_short_up_still_builds_view() {
        let mut camera = Camera::default();
        camera.set_up(Vec3::new(0.0, 1.0e-8, 0.0));
        camera.update();

        let expected = Mat4::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::zeros(), Vec3::y());
        assert_relative_eq!(*camera.view_matrix().unwrap(), expected, epsilon = 1e-6);
    }
}
