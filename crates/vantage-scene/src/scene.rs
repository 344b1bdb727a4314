use std::collections::HashMap;

use tracing::debug;

use vantage_base::{Error, Guid, Result};
use vantage_geometry::{Aabb, Matrix4, One, Quaternion, Trs, Vector3, compose};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(Guid);

impl NodeId {
    fn new() -> Self {
        Self(Guid::new())
    }

    pub fn guid(&self) -> Guid {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub position: Vector3,
    pub quaternion: Quaternion,
    pub scale: Vector3,
    pub bounds: Option<Aabb>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            quaternion: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            bounds: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn with_quaternion(mut self, quaternion: Quaternion) -> Self {
        self.quaternion = quaternion;
        self
    }

    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn trs(&self) -> Trs {
        Trs::new(self.position, self.quaternion, self.scale)
    }

    pub fn set_trs(&mut self, trs: Trs) {
        self.position = trs.position;
        self.quaternion = trs.quaternion;
        self.scale = trs.scale;
    }

    pub fn local_matrix(&self) -> Matrix4 {
        compose(self.position, self.quaternion, self.scale)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(Error::UnknownNode(parent.guid()))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        Ok(id)
    }

    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get(&id).ok_or(Error::UnknownNode(id.guid()))?;
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        debug!(node = %id, removed, "removed subtree");
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push((id, node));
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order.into_iter()
    }

    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4> {
        let node = self.nodes.get(&id).ok_or(Error::UnknownNode(id.guid()))?;
        let mut matrix = node.local_matrix();
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self
                .nodes
                .get(&parent_id)
                .ok_or(Error::UnknownNode(parent_id.guid()))?;
            matrix = parent.local_matrix() * matrix;
            current = parent.parent;
        }
        Ok(matrix)
    }

    pub fn world_trs(&self, id: NodeId) -> Result<Trs> {
        Ok(Trs::from_matrix(&self.world_matrix(id)?))
    }

    pub fn parent_world_trs(&self, id: NodeId) -> Result<Trs> {
        let node = self.nodes.get(&id).ok_or(Error::UnknownNode(id.guid()))?;
        match node.parent {
            Some(parent) => self.world_trs(parent),
            None => Ok(Trs::identity()),
        }
    }

    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let bounds = self.nodes.get(&id)?.bounds?;
        let matrix = self.world_matrix(id).ok()?;
        Some(bounds.transformed(&matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_subtree() -> Result<()> {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("root"));
        let child = scene.add_child(root, Node::new("child"))?;
        let grandchild = scene.add_child(child, Node::new("grandchild"))?;
        scene.remove(child)?;
        assert!(scene.contains(root));
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.node(root).is_some_and(|node| node.children().is_empty()));
        Ok(())
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let mut scene = Scene::new();
        let root = scene.add(Node::new("root"));
        let _ = scene.remove(root);
        assert!(scene.add_child(root, Node::new("orphan")).is_err());
    }
}
