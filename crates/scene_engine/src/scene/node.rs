//! Node variants stored in the scene graph arena

use crate::foundation::math::Mat4;

use super::error::{PayloadKind, SceneError};
use super::graph::NodeHandle;
use super::leaves::{CameraHandle, LeafStore, LightHandle, ObjectHandle, Payload};
use super::transform::TransformNode;

/// Ordered fan-out with no transform of its own
#[derive(Debug, Clone, Default)]
pub struct Branch {
    pub(crate) children: Vec<NodeHandle>,
}

impl Branch {
    /// Children in insertion order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

/// Leaf that hands the world matrix to one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    payload: Payload,
}

impl Container {
    /// Wrap a payload handle
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }

    /// Held payload
    pub fn payload(&self) -> Payload {
        self.payload
    }

    /// Deliver `world_matrix` to the payload; clean traversals do nothing
    pub fn update(&self, world_matrix: &Mat4, dirty: bool, leaves: &mut LeafStore) -> Result<(), SceneError> {
        if !dirty {
            return Ok(());
        }
        self.payload.apply_transform(world_matrix, leaves)
    }

    /// Held object, or an error for any other payload
    pub fn object(&self) -> Result<ObjectHandle, SceneError> {
        match self.payload {
            Payload::Object(handle) => Ok(handle),
            other => Err(wrong_payload(PayloadKind::Object, other)),
        }
    }

    /// Held light, or an error for any other payload
    pub fn light(&self) -> Result<LightHandle, SceneError> {
        match self.payload {
            Payload::Light(handle) => Ok(handle),
            other => Err(wrong_payload(PayloadKind::Light, other)),
        }
    }

    /// Camera owning the held anchor, or an error for non-camera payloads
    pub fn camera(&self) -> Result<CameraHandle, SceneError> {
        match self.payload {
            Payload::CameraPosition(handle) | Payload::CameraFocus(handle) => Ok(handle),
            other => Err(wrong_payload(PayloadKind::Camera, other)),
        }
    }
}

fn wrong_payload(expected: PayloadKind, found: Payload) -> SceneError {
    SceneError::WrongPayload { expected, found: found.kind() }
}

/// One node in the graph
#[derive(Debug)]
pub enum Node {
    /// Ordered fan-out
    Branch(Branch),
    /// Single-child local transform
    Transform(TransformNode),
    /// Payload leaf
    Container(Container),
}

impl Node {
    /// Variant name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Branch(_) => "branch",
            Self::Transform(_) => "transform",
            Self::Container(_) => "container",
        }
    }

    /// Direct children in traversal order
    pub fn children(&self) -> &[NodeHandle] {
        match self {
            Self::Branch(branch) => branch.children(),
            Self::Transform(transform) => transform.child.as_slice(),
            Self::Container(_) => &[],
        }
    }
}
