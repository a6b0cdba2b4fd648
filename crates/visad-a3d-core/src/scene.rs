//! Arena-backed scene graph.
//!
//! Nodes live in a slot arena and are addressed by [`NodeId`], a stable
//! index plus a generation counter. Ids of removed nodes never alias a node
//! created later in the same slot.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use crate::error::{Result, VisadError};

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Returns the arena slot index.
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A text label placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    /// The label text.
    pub text: String,
    /// Anchor position.
    pub position: Vec3,
    /// Baseline direction of the text.
    pub baseline: Vec3,
}

/// Renderable geometry: line segments, filled triangles and labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryArray {
    /// Line vertices, two per segment.
    pub lines: Vec<Vec3>,
    /// Triangle vertices, three per triangle.
    pub triangles: Vec<Vec3>,
    /// Text labels.
    pub labels: Vec<TextLabel>,
    /// RGBA color.
    pub color: [f32; 4],
}

impl GeometryArray {
    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.triangles.is_empty() && self.labels.is_empty()
    }

    /// Returns the axis-aligned bounds of all vertices and label anchors.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .lines
            .iter()
            .chain(&self.triangles)
            .copied()
            .chain(self.labels.iter().map(|l| l.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

/// What a node renders or how it treats its children.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodePayload {
    /// Renders nothing; placeholder for a frame not yet populated.
    #[default]
    Empty,
    /// Renders all children.
    Group,
    /// Renders at most one child.
    Switch {
        /// Index of the visible child.
        which: Option<usize>,
    },
    /// Renders geometry.
    Geometry(Arc<GeometryArray>),
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    payload: NodePayload,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload.
    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    /// Returns the parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the geometry if this is a geometry node.
    pub fn geometry(&self) -> Option<&Arc<GeometryArray>> {
        match &self.payload {
            NodePayload::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Scene graph owning all nodes.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a scene graph containing only a root group.
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            live: 0,
        };
        graph.root = graph.create_node("root", NodePayload::Group);
        graph
    }

    /// Returns the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if only the root remains.
    pub fn is_empty(&self) -> bool {
        self.live <= 1
    }

    /// Creates a detached node.
    pub fn create_node(&mut self, name: impl Into<String>, payload: NodePayload) -> NodeId {
        let node = SceneNode {
            name: name.into(),
            payload,
            parent: None,
            children: Vec::new(),
        };
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Returns whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the node for `id`, if live.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    /// Returns the node for `id`.
    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or(VisadError::UnknownNode(id))
    }

    /// Replaces a node's payload.
    pub fn set_payload(&mut self, id: NodeId, payload: NodePayload) -> Result<()> {
        self.get_mut(id).ok_or(VisadError::UnknownNode(id))?.payload = payload;
        Ok(())
    }

    /// Sets the visible child of a switch node. Non-switch nodes become
    /// switches.
    pub fn set_switch(&mut self, id: NodeId, which: Option<usize>) -> Result<()> {
        self.set_payload(id, NodePayload::Switch { which })
    }

    /// Attaches `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(VisadError::SceneCycle { parent, child });
        }
        if let Some(old_parent) = self.node(child)?.parent {
            self.detach_child(old_parent, child)?;
        }
        self.get_mut(parent)
            .ok_or(VisadError::UnknownNode(parent))?
            .children
            .push(child);
        self.get_mut(child).ok_or(VisadError::UnknownNode(child))?.parent = Some(parent);
        Ok(())
    }

    /// Detaches `child` from `parent`. The child stays alive.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let children = &mut self
            .get_mut(parent)
            .ok_or(VisadError::UnknownNode(parent))?
            .children;
        let position = children
            .iter()
            .position(|c| *c == child)
            .ok_or(VisadError::NotAChild { parent, child })?;
        children.remove(position);
        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
        Ok(())
    }

    /// Detaches every child of `parent`, returning them in order.
    pub fn detach_all(&mut self, parent: NodeId) -> Result<Vec<NodeId>> {
        let children = std::mem::take(
            &mut self
                .get_mut(parent)
                .ok_or(VisadError::UnknownNode(parent))?
                .children,
        );
        for child in &children {
            if let Some(node) = self.get_mut(*child) {
                node.parent = None;
            }
        }
        Ok(children)
    }

    /// Returns the `i`-th child of `parent`.
    pub fn child(&self, parent: NodeId, i: usize) -> Option<NodeId> {
        self.get(parent)?.children.get(i).copied()
    }

    /// Returns the number of children of `parent`.
    pub fn num_children(&self, parent: NodeId) -> Result<usize> {
        Ok(self.node(parent)?.children.len())
    }

    /// Removes a node and all of its descendants, returning how many nodes
    /// were released. The root cannot be removed; its children are
    /// released instead.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<usize> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.detach_child(parent, id)?;
        }
        let mut stack = if id == self.root {
            self.detach_all(id)?
        } else {
            vec![id]
        };
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.index as usize];
            if slot.generation != next.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
                self.live -= 1;
                removed += 1;
                stack.extend(node.children);
            }
        }
        Ok(removed)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Returns the nodes that would be drawn under `id`, honoring switches.
    pub fn visible_geometry(&self, id: NodeId) -> Vec<Arc<GeometryArray>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.get(next) else {
                continue;
            };
            match &node.payload {
                NodePayload::Geometry(g) => {
                    out.push(Arc::clone(g));
                    stack.extend(node.children.iter().rev());
                }
                NodePayload::Switch { which } => {
                    if let Some(child) = which.and_then(|w| node.children.get(w)) {
                        stack.push(*child);
                    }
                }
                NodePayload::Group | NodePayload::Empty => {
                    stack.extend(node.children.iter().rev());
                }
            }
        }
        out
    }
}
