//! Surface Arena
//!
//! The surface owns every live node and the parent/child edges between them.
//!
//! # Selectors
//!
//! `select` understands three selector forms, matched depth-first from the
//! root in paint order:
//!
//! - `#name`: a node whose `id` attribute is the text `name`
//! - `.name`: a node carrying the class `name`
//! - `name`: a node whose tag is `name`

use std::collections::HashMap;

use super::node::{AttrValue, NodeId, VisualNode};

/// The retained scene graph for one document.
#[derive(Debug)]
pub struct Surface {
    /// All attached nodes, indexed by ID.
    nodes: HashMap<NodeId, VisualNode>,

    root: NodeId,
}

impl Surface {
    /// Create a surface holding only a root node.
    pub fn new() -> Self {
        let root = VisualNode::new("root", None);
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
        }
    }

    /// Get the root node's ID.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element under `parent`.
    ///
    /// Returns `None` if `parent` is not attached.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        let parent_node = self.nodes.get_mut(&parent)?;
        let node = VisualNode::new(tag, Some(parent));
        let id = node.id();
        parent_node.push_child(id);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Append a new element carrying `class` under `parent`.
    pub fn append_with_class(&mut self, parent: NodeId, tag: &str, class: &str) -> Option<NodeId> {
        let id = self.append(parent, tag)?;
        self.add_class(id, class);
        Some(id)
    }

    /// Add a class to a node. Returns false if the node is not attached.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        match self.nodes.get_mut(&node) {
            Some(n) => {
                n.add_class(class);
                true
            }
            None => false,
        }
    }

    /// Set an attribute. Returns false if the node is not attached.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<AttrValue>) -> bool {
        match self.nodes.get_mut(&node) {
            Some(n) => {
                n.set_attr(name, value.into());
                true
            }
            None => false,
        }
    }

    /// Get an attribute of an attached node.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&AttrValue> {
        self.nodes.get(&node)?.attr(name)
    }

    /// Get a reference to a node.
    pub fn get(&self, node: NodeId) -> Option<&VisualNode> {
        self.nodes.get(&node)
    }

    /// Check whether a node is attached.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Get the children of a node, empty if the node is not attached.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(&node).map(VisualNode::children).unwrap_or(&[])
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns the IDs of every removed node. Detaching the root or a node
    /// that is not attached removes nothing.
    pub fn detach(&mut self, node: NodeId) -> Vec<NodeId> {
        if node == self.root {
            return Vec::new();
        }
        let Some(parent) = self.nodes.get(&node).map(VisualNode::parent) else {
            return Vec::new();
        };

        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent_node.remove_child(node);
        }

        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                stack.extend(n.children().iter().copied());
                removed.push(id);
            }
        }
        removed
    }

    /// Move a node to the end of its parent's children so it paints on top.
    pub fn raise(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(VisualNode::parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.remove_child(node);
            parent_node.push_child(node);
        }
    }

    /// Find the first direct child of `parent` carrying `class`.
    pub fn select_child(&self, parent: NodeId, class: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.nodes.get(c).is_some_and(|n| n.has_class(class)))
    }

    /// Find every direct child of `parent` carrying `class`, in paint order.
    pub fn select_all(&self, parent: NodeId, class: &str) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|c| self.nodes.get(c).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    /// Get the child of `parent` carrying `class`, creating it if absent.
    ///
    /// Returns the child and whether it was created by this call. Returns
    /// `None` only if `parent` is not attached.
    pub fn select_enter(
        &mut self,
        parent: NodeId,
        class: &str,
        tag: &str,
    ) -> Option<(NodeId, bool)> {
        if let Some(existing) = self.select_child(parent, class) {
            return Some((existing, false));
        }
        self.append_with_class(parent, tag, class).map(|id| (id, true))
    }

    /// Find the first node matching `selector`, depth-first from the root.
    pub fn select(&self, selector: &str) -> Option<NodeId> {
        let matches = |n: &VisualNode| {
            if let Some(id) = selector.strip_prefix('#') {
                n.attr("id").and_then(AttrValue::as_text) == Some(id)
            } else if let Some(class) = selector.strip_prefix('.') {
                n.has_class(class)
            } else {
                n.tag() == selector
            }
        };

        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if id != self.root && matches(node) {
                return Some(id);
            }
            stack.extend(node.children().iter().rev().copied());
        }
        None
    }

    /// Count the nodes strictly below `node`.
    pub fn descendant_count(&self, node: NodeId) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.children(id).iter().copied());
        }
        count
    }

    /// Get the total number of attached nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_detach_subtree() {
        let mut surface = Surface::new();
        let root = surface.root();

        let group = surface.append(root, "g").unwrap();
        let circle = surface.append(group, "circle").unwrap();
        surface.append(root, "g").unwrap();

        assert_eq!(surface.node_count(), 4);

        let removed = surface.detach(group);
        assert_eq!(removed.len(), 2);
        assert!(!surface.contains(group));
        assert!(!surface.contains(circle));
        assert_eq!(surface.children(root).len(), 1);
    }

    #[test]
    fn detaching_twice_or_the_root_is_a_no_op() {
        let mut surface = Surface::new();
        let root = surface.root();
        let group = surface.append(root, "g").unwrap();

        assert_eq!(surface.detach(group).len(), 1);
        assert!(surface.detach(group).is_empty());
        assert!(surface.detach(root).is_empty());
        assert_eq!(surface.node_count(), 1);
    }

    #[test]
    fn select_enter_creates_only_once() {
        let mut surface = Surface::new();
        let root = surface.root();

        let (first, created) = surface.select_enter(root, "symbol", "g").unwrap();
        assert!(created);
        let (second, created) = surface.select_enter(root, "symbol", "g").unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(surface.descendant_count(root), 1);
    }

    #[test]
    fn select_by_id_class_and_tag() {
        let mut surface = Surface::new();
        let root = surface.root();

        let container = surface.append(root, "div").unwrap();
        surface.set_attr(container, "id", "plot_2d");
        let svg = surface.append_with_class(container, "svg", "plotSvg").unwrap();

        assert_eq!(surface.select("#plot_2d"), Some(container));
        assert_eq!(surface.select(".plotSvg"), Some(svg));
        assert_eq!(surface.select("svg"), Some(svg));
        assert_eq!(surface.select("#missing"), None);
    }

    #[test]
    fn raise_moves_node_to_top() {
        let mut surface = Surface::new();
        let root = surface.root();
        let a = surface.append(root, "g").unwrap();
        let b = surface.append(root, "g").unwrap();

        surface.raise(a);
        assert_eq!(surface.children(root), &[b, a]);
    }

    #[test]
    fn attributes_on_detached_nodes_are_ignored() {
        let mut surface = Surface::new();
        let root = surface.root();
        let group = surface.append(root, "g").unwrap();
        surface.detach(group);

        assert!(!surface.set_attr(group, "r", 3.0));
        assert!(surface.attr(group, "r").is_none());
        assert!(surface.append(group, "circle").is_none());
    }
}
