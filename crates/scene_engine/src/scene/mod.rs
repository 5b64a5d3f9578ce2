//! Scene graph with dirty-tracked transform propagation
//!
//! Building blocks, from the leaves up:
//!
//! - [`Object`], [`Light`] and [`Camera`] are payloads stored in a [`LeafStore`]
//! - [`SceneGraph`] arranges branches, transforms and containers over them
//! - [`Scene`] ties both together with materials and the per-frame upload

pub mod animation;
pub mod camera;
pub mod error;
pub mod graph;
pub mod leaves;
pub mod light;
pub mod material;
pub mod node;
pub mod object;
pub mod transform;
pub mod world;

#[cfg(test)]
mod tests;

pub use animation::{ease_scale, keyframe_path, orbit, spin, Keyframe, OrbitInput, SharedOrbitInput};
pub use camera::{Anchor, AnchorRole, Camera, CameraFocusAnchor, CameraPositionAnchor, FocusRole, PositionRole};
pub use error::{PayloadKind, SceneError};
pub use graph::{NodeBuilder, NodeHandle, SceneGraph};
pub use leaves::{CameraHandle, LeafPayload, LeafStore, LightHandle, ObjectHandle, Payload};
pub use light::Light;
pub use material::{Material, MaterialConstants};
pub use node::{Branch, Container, Node};
pub use object::{GeometryHandle, Object};
pub use transform::{no_transform, TransformFn, TransformNode, TransformUpdate};
pub use world::{FrameReport, Scene};
