//! Transform nodes and their update callbacks
//!
//! A transform node owns one child and a user callback. Each traversal the
//! callback may rewrite the node's private matrix and rotation state and
//! reports whether its local contribution changed. The node then decides what
//! world matrix and dirty flag its child sees:
//!
//! | callback result | local matrix      | child dirty    |
//! |-----------------|-------------------|----------------|
//! | `Changed(m)`    | replaced by `m`   | `true`         |
//! | `Unchanged`     | kept              | `parent_dirty` |
//!
//! In both cases the child's world matrix is `parent_world * local`.

use std::fmt;

use crate::foundation::math::{Mat4, Quat};

use super::graph::NodeHandle;

/// Result of a transform callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformUpdate {
    /// Local matrix is the same as last frame
    Unchanged,
    /// New local matrix
    Changed(Mat4),
}

/// Per-frame transform callback
///
/// Receives the node's matrix state, rotation state and the frame delta in
/// seconds. Callbacks that read external input capture it through shared
/// ownership; the engine updates the graph on one thread.
pub type TransformFn = Box<dyn FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate>;

/// Callback that never changes anything
pub fn no_transform() -> TransformFn {
    Box::new(|_, _, _| TransformUpdate::Unchanged)
}

/// Node that contributes a local matrix to a single child
pub struct TransformNode {
    update_fn: TransformFn,
    local: Mat4,
    matrix_state: Mat4,
    rotation_state: Quat,
    pub(crate) child: Option<NodeHandle>,
}

impl TransformNode {
    /// Identity transform with no callback
    pub fn new() -> Self {
        Self {
            update_fn: no_transform(),
            local: Mat4::identity(),
            matrix_state: Mat4::identity(),
            rotation_state: Quat::identity(),
            child: None,
        }
    }

    /// Seed the matrix state; also used as the local matrix until the callback reports a change
    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.matrix_state = matrix;
        self.local = matrix;
        self
    }

    /// Seed the rotation state
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation_state = rotation;
        self
    }

    /// Install the update callback
    pub fn with_update<F>(mut self, update_fn: F) -> Self
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate + 'static,
    {
        self.update_fn = Box::new(update_fn);
        self
    }

    /// Install an already boxed callback
    pub fn with_boxed_update(mut self, update_fn: TransformFn) -> Self {
        self.update_fn = update_fn;
        self
    }

    /// Run the callback and compute what the child receives
    ///
    /// Returns the child's world matrix and dirty flag.
    pub fn evaluate(&mut self, delta_time: f32, parent_world: &Mat4, parent_dirty: bool) -> (Mat4, bool) {
        let dirty = match (self.update_fn)(&mut self.matrix_state, &mut self.rotation_state, delta_time) {
            TransformUpdate::Changed(local) => {
                self.local = local;
                true
            }
            TransformUpdate::Unchanged => parent_dirty,
        };

        (parent_world * self.local, dirty)
    }

    /// Local matrix applied to the child
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local
    }

    /// Callback-owned matrix state
    pub fn matrix_state(&self) -> &Mat4 {
        &self.matrix_state
    }

    /// Callback-owned rotation state
    pub fn rotation_state(&self) -> &Quat {
        &self.rotation_state
    }

    /// The single child, if attached
    pub fn child(&self) -> Option<NodeHandle> {
        self.child
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformNode")
            .field("local", &self.local)
            .field("matrix_state", &self.matrix_state)
            .field("rotation_state", &self.rotation_state)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_unchanged_passes_parent_dirty_through() {
        let mut node = TransformNode::new().with_matrix(Mat4::new_translation(&Vec3::x()));
        let parent = Mat4::new_scaling(2.0);

        let (world, dirty) = node.evaluate(0.1, &parent, false);
        assert!(!dirty);
        assert_eq!(world, parent * Mat4::new_translation(&Vec3::x()));

        let (_, dirty) = node.evaluate(0.1, &parent, true);
        assert!(dirty);
    }

    #[test]
    fn test_changed_replaces_local_and_dirties() {
        let mut node = TransformNode::new().with_update(|m, _, dt| {
            *m *= Mat4::rotation_z(dt);
            TransformUpdate::Changed(*m)
        });

        let (world, dirty) = node.evaluate(0.5, &Mat4::identity(), false);
        assert!(dirty);
        assert_relative_eq!(world, Mat4::rotation_z(0.5), epsilon = 1e-6);
        assert_relative_eq!(*node.local_matrix(), Mat4::rotation_z(0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_changed_local_persists_through_unchanged_frames() {
        let mut first = true;
        let mut node = TransformNode::new().with_update(move |_, _, _| {
            if std::mem::take(&mut first) {
                TransformUpdate::Changed(Mat4::new_translation(&Vec3::y()))
            } else {
                TransformUpdate::Unchanged
            }
        });

        node.evaluate(0.0, &Mat4::identity(), false);
        let (world, dirty) = node.evaluate(0.0, &Mat4::identity(), false);
        assert!(!dirty);
        assert_eq!(world, Mat4::new_translation(&Vec3::y()));
    }

    #[test]
    fn test_rotation_state_is_seeded() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.25);
        let node = TransformNode::new().with_rotation(rotation);
        assert_eq!(*node.rotation_state(), rotation);
        assert!(node.child().is_none());
    }
}
