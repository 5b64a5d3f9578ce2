//! Scene graph arena and traversal
//!
//! Nodes live in a generational arena and refer to each other by
//! [`NodeHandle`]. The graph is a tree rooted at a branch created with the
//! graph: branches fan out to ordered children, transforms own at most one
//! child, and containers are leaves holding a payload handle.
//!
//! [`SceneGraph::update`] walks the tree depth-first, children in insertion
//! order, threading the accumulated world matrix and the dirty flag downward.
//! Every node observes its parent's post-update state. The walk is iterative
//! over a stack kept on the graph, so steady-state frames do not allocate and
//! deep chains cannot overflow the call stack.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Mat4, Quat};

use super::error::SceneError;
use super::leaves::{CameraHandle, LeafStore, Payload};
use super::node::{Branch, Container, Node};
use super::transform::{TransformNode, TransformUpdate};

new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeHandle;
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    node: NodeHandle,
    world: Mat4,
    dirty: bool,
}

/// Tree of branches, transforms and containers
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,
    stack: Vec<Visit>,
    revision: u64,
}

impl SceneGraph {
    /// Create a graph holding only an empty root branch
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::Branch(Branch::default()));
        Self { nodes, root, stack: Vec::new(), revision: 0 }
    }

    /// Root branch
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Counter bumped by every successful insertion
    ///
    /// Nodes attached after the first pass only receive a world matrix on a
    /// dirty traversal; callers compare revisions to know when to force one.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a node
    pub fn node(&self, handle: NodeHandle) -> Result<&Node, SceneError> {
        self.nodes.get(handle).ok_or(SceneError::InvalidNode(handle))
    }

    /// Look up a transform node
    pub fn transform_node(&self, handle: NodeHandle) -> Result<&TransformNode, SceneError> {
        match self.node(handle)? {
            Node::Transform(transform) => Ok(transform),
            other => Err(SceneError::WrongNodeKind {
                node: handle,
                expected: "transform",
                found: other.kind_name(),
            }),
        }
    }

    /// Look up a container node
    pub fn container(&self, handle: NodeHandle) -> Result<&Container, SceneError> {
        match self.node(handle)? {
            Node::Container(container) => Ok(container),
            other => Err(SceneError::WrongNodeKind {
                node: handle,
                expected: "container",
                found: other.kind_name(),
            }),
        }
    }

    /// Child of a transform, failing when nothing was attached
    pub fn transform_child(&self, handle: NodeHandle) -> Result<NodeHandle, SceneError> {
        self.transform_node(handle)?.child().ok_or(SceneError::MissingChild(handle))
    }

    /// Add a branch below `parent`
    pub fn add_branch(&mut self, parent: NodeHandle) -> Result<NodeHandle, SceneError> {
        self.attach(parent, Node::Branch(Branch::default()))
    }

    /// Add a transform below `parent`
    pub fn add_transform(&mut self, parent: NodeHandle, transform: TransformNode) -> Result<NodeHandle, SceneError> {
        self.attach(parent, Node::Transform(transform))
    }

    /// Add a container leaf below `parent`
    pub fn add_container(&mut self, parent: NodeHandle, payload: impl Into<Payload>) -> Result<NodeHandle, SceneError> {
        self.attach(parent, Node::Container(Container::new(payload.into())))
    }

    /// Fluent builder positioned at `handle`
    pub fn at(&mut self, handle: NodeHandle) -> NodeBuilder<'_> {
        NodeBuilder { graph: self, handle }
    }

    /// Fluent builder positioned at the root
    pub fn at_root(&mut self) -> NodeBuilder<'_> {
        let root = self.root;
        self.at(root)
    }

    fn attach(&mut self, parent: NodeHandle, node: Node) -> Result<NodeHandle, SceneError> {
        let handle = self.nodes.insert(node);
        let attached = match self.nodes.get_mut(parent) {
            None => Err(SceneError::InvalidNode(parent)),
            Some(Node::Container(_)) => Err(SceneError::ContainerParent(parent)),
            Some(Node::Transform(transform)) if transform.child.is_some() => {
                Err(SceneError::TransformOccupied(parent))
            }
            Some(Node::Transform(transform)) => {
                transform.child = Some(handle);
                Ok(())
            }
            Some(Node::Branch(branch)) => {
                branch.children.push(handle);
                Ok(())
            }
        };

        if let Err(err) = attached {
            self.nodes.remove(handle);
            return Err(err);
        }

        self.revision += 1;
        log::trace!("Attached node {:?} below {:?}", handle, parent);
        Ok(handle)
    }

    /// Propagate transforms from the root
    ///
    /// Pass `dirty = true` on the first call so every payload receives a world
    /// matrix; afterwards only subtrees below a changed transform are touched.
    pub fn update(&mut self, delta_time: f32, world: &Mat4, dirty: bool, leaves: &mut LeafStore) -> Result<(), SceneError> {
        let root = self.root;
        self.update_from(root, delta_time, world, dirty, leaves)
    }

    /// Propagate transforms through the subtree at `start`
    pub fn update_from(
        &mut self,
        start: NodeHandle,
        delta_time: f32,
        world: &Mat4,
        dirty: bool,
        leaves: &mut LeafStore,
    ) -> Result<(), SceneError> {
        let mut stack = std::mem::take(&mut self.stack);
        stack.push(Visit { node: start, world: *world, dirty });

        let result = self.drain(&mut stack, delta_time, leaves);

        // An aborted walk leaves entries behind
        stack.clear();
        self.stack = stack;
        result
    }

    fn drain(&mut self, stack: &mut Vec<Visit>, delta_time: f32, leaves: &mut LeafStore) -> Result<(), SceneError> {
        while let Some(Visit { node, world, dirty }) = stack.pop() {
            match self.nodes.get_mut(node).ok_or(SceneError::InvalidNode(node))? {
                Node::Branch(branch) => {
                    // Reversed so the first child is popped first
                    stack.extend(branch.children.iter().rev().map(|&child| Visit { node: child, world, dirty }));
                }
                Node::Transform(transform) => {
                    let (child_world, child_dirty) = transform.evaluate(delta_time, &world, dirty);
                    if let Some(child) = transform.child() {
                        stack.push(Visit { node: child, world: child_world, dirty: child_dirty });
                    }
                }
                Node::Container(container) => container.update(&world, dirty, leaves)?,
            }
        }
        Ok(())
    }

    /// Handles in traversal order, for inspection
    pub fn traversal_order(&self) -> Vec<NodeHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![self.root];
        while let Some(handle) = pending.pop() {
            if let Some(node) = self.nodes.get(handle) {
                order.push(handle);
                pending.extend(node.children().iter().rev());
            }
        }
        order
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor for building a subtree fluently
///
/// Each method inserts below the current node and returns a builder positioned
/// at the new node, so chains read top-down:
///
/// ```
/// # use scene_engine::scene::{SceneGraph, LeafStore, Object, GeometryHandle};
/// # use scene_engine::foundation::math::{Mat4, Vec3};
/// let mut leaves = LeafStore::new();
/// let object = leaves.add_object(Object::new(GeometryHandle(0), 0, 0));
///
/// let mut graph = SceneGraph::new();
/// graph
///     .at_root()
///     .transform_matrix(Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0)))?
///     .insert(object)?;
/// # Ok::<(), scene_engine::scene::SceneError>(())
/// ```
#[derive(Debug)]
pub struct NodeBuilder<'g> {
    graph: &'g mut SceneGraph,
    handle: NodeHandle,
}

impl<'g> NodeBuilder<'g> {
    /// Node the cursor is positioned at
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    /// Add a branch and move to it
    pub fn branch(self) -> Result<Self, SceneError> {
        let handle = self.graph.add_branch(self.handle)?;
        Ok(Self { graph: self.graph, handle })
    }

    /// Add an identity transform with no callback and move to it
    pub fn transform(self) -> Result<Self, SceneError> {
        self.transform_with(TransformNode::new())
    }

    /// Add a fixed transform and move to it
    pub fn transform_matrix(self, matrix: Mat4) -> Result<Self, SceneError> {
        self.transform_with(TransformNode::new().with_matrix(matrix))
    }

    /// Add an animated transform starting from identity and move to it
    pub fn transform_fn<F>(self, update_fn: F) -> Result<Self, SceneError>
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate + 'static,
    {
        self.transform_with(TransformNode::new().with_update(update_fn))
    }

    /// Add an animated transform seeded with `matrix` and move to it
    pub fn transform_matrix_fn<F>(self, matrix: Mat4, update_fn: F) -> Result<Self, SceneError>
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate + 'static,
    {
        self.transform_with(TransformNode::new().with_matrix(matrix).with_update(update_fn))
    }

    /// Add an animated transform seeded with `rotation` and move to it
    pub fn transform_rotation_fn<F>(self, rotation: Quat, update_fn: F) -> Result<Self, SceneError>
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate + 'static,
    {
        self.transform_with(TransformNode::new().with_rotation(rotation).with_update(update_fn))
    }

    /// Add an animated transform seeded with both `rotation` and `matrix` and move to it
    pub fn transform_rotation_matrix_fn<F>(self, rotation: Quat, matrix: Mat4, update_fn: F) -> Result<Self, SceneError>
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate + 'static,
    {
        self.transform_with(
            TransformNode::new()
                .with_rotation(rotation)
                .with_matrix(matrix)
                .with_update(update_fn),
        )
    }

    /// Add a fully configured transform and move to it
    pub fn transform_with(self, transform: TransformNode) -> Result<Self, SceneError> {
        let handle = self.graph.add_transform(self.handle, transform)?;
        Ok(Self { graph: self.graph, handle })
    }

    /// Add a container leaf; the chain ends here
    pub fn insert(self, payload: impl Into<Payload>) -> Result<NodeHandle, SceneError> {
        self.graph.add_container(self.handle, payload)
    }

    /// Add both anchors of a camera below this node
    ///
    /// The current node must be a branch, since it receives two children.
    pub fn insert_camera(self, camera: CameraHandle) -> Result<(NodeHandle, NodeHandle), SceneError> {
        match self.graph.node(self.handle)? {
            Node::Branch(_) => {}
            other => {
                return Err(SceneError::WrongNodeKind {
                    node: self.handle,
                    expected: "branch",
                    found: other.kind_name(),
                })
            }
        }
        let position = self.graph.add_container(self.handle, Payload::CameraPosition(camera))?;
        let focus = self.graph.add_container(self.handle, Payload::CameraFocus(camera))?;
        Ok((position, focus))
    }
}
