//! Structural invariant failures of the scene graph
//!
//! None of these are recoverable: they mean the scene was wired incorrectly or
//! a handle outlived its payload. They propagate with `?` up to the frame loop,
//! which logs them and aborts the run.

use std::fmt;

use thiserror::Error;

use super::graph::NodeHandle;

/// Which kind of leaf a container payload refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Drawable object
    Object,
    /// Light source
    Light,
    /// Camera position anchor
    CameraPosition,
    /// Camera focus anchor
    CameraFocus,
    /// Camera owning both anchors
    Camera,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::Light => "light",
            Self::CameraPosition => "camera position anchor",
            Self::CameraFocus => "camera focus anchor",
            Self::Camera => "camera",
        };
        f.write_str(name)
    }
}

/// Scene graph invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Node handle does not belong to this graph
    #[error("node {0:?} does not exist in this scene graph")]
    InvalidNode(NodeHandle),

    /// Children can only be attached to branches and transforms
    #[error("cannot attach a child below container node {0:?}")]
    ContainerParent(NodeHandle),

    /// A transform owns at most one child
    #[error("transform node {0:?} already owns a child")]
    TransformOccupied(NodeHandle),

    /// A transform was required to have a child but has none
    #[error("transform node {0:?} has no child")]
    MissingChild(NodeHandle),

    /// Node exists but is not of the requested kind
    #[error("node {node:?} is a {found}, expected a {expected}")]
    WrongNodeKind {
        /// Offending node
        node: NodeHandle,
        /// Kind the caller asked for
        expected: &'static str,
        /// Kind actually stored
        found: &'static str,
    },

    /// Container payload is not of the requested variant
    #[error("container holds a {found}, expected a {expected}")]
    WrongPayload {
        /// Variant the caller asked for
        expected: PayloadKind,
        /// Variant actually stored
        found: PayloadKind,
    },

    /// Payload handle no longer resolves in its arena
    #[error("{0} handle does not resolve to a live payload")]
    StalePayload(PayloadKind),

    /// Camera view read before the anchors were recomposed
    #[error("camera read while its {0} is dirty; call Camera::update first")]
    CameraAnchorDirty(PayloadKind),
}
