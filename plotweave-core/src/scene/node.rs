//! Scene Nodes
//!
//! This module defines the element type that lives in the render surface.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Unique identifier for a node in the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The value of a node attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A scalar such as a radius, an opacity or an angle.
    Number(f64),

    /// A 2-D position, used for translations.
    Point { x: f64, y: f64 },

    /// Free-form text. Text does not interpolate.
    Text(String),
}

impl AttrValue {
    /// Build a point value.
    pub fn point(x: f64, y: f64) -> Self {
        AttrValue::Point { x, y }
    }

    /// Interpolate between `self` and `to` at progress `t` in `[0, 1]`.
    ///
    /// Mismatched kinds and text hold the start value until `t` reaches 1.
    pub fn interpolate(&self, to: &AttrValue, t: f64) -> AttrValue {
        match (self, to) {
            (AttrValue::Number(a), AttrValue::Number(b)) => AttrValue::Number(a + (b - a) * t),
            (AttrValue::Point { x: x0, y: y0 }, AttrValue::Point { x: x1, y: y1 }) => {
                AttrValue::Point {
                    x: x0 + (x1 - x0) * t,
                    y: y0 + (y1 - y0) * t,
                }
            }
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }

    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The coordinates, if this is a point.
    pub fn as_point(&self) -> Option<(f64, f64)> {
        match self {
            AttrValue::Point { x, y } => Some((*x, *y)),
            _ => None,
        }
    }

    /// The text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<(f64, f64)> for AttrValue {
    fn from((x, y): (f64, f64)) -> Self {
        AttrValue::Point { x, y }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// An element of the render surface.
#[derive(Debug, Clone)]
pub struct VisualNode {
    id: NodeId,

    /// Element kind, e.g. `g`, `circle`, `path`.
    tag: String,

    classes: SmallVec<[String; 2]>,

    /// Attributes in insertion order.
    attrs: IndexMap<String, AttrValue>,

    parent: Option<NodeId>,

    /// Children in paint order.
    children: SmallVec<[NodeId; 4]>,
}

impl VisualNode {
    pub(crate) fn new(tag: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            id: NodeId::new(),
            tag: tag.into(),
            classes: SmallVec::new(),
            attrs: IndexMap::new(),
            parent,
            children: SmallVec::new(),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the node's parent, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Get the node's children in paint order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check whether the node carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Get the node's classes.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Get all attributes in insertion order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    pub(crate) fn set_attr(&mut self, name: &str, value: AttrValue) {
        self.attrs.insert(name.to_owned(), value);
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.children.retain(|c| *c != child);
    }
}
