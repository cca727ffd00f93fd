//! Render Surface
//!
//! This module implements the retained scene graph that charts draw into.
//! It plays the role a document tree plays in a browser: glyphs append
//! elements, set attributes and detach elements, and the animation layer
//! interpolates attribute values over time.
//!
//! # Overview
//!
//! The surface is a tree rooted at a permanent root node:
//!
//! - Nodes carry a tag, a class list and an ordered attribute map
//! - Children are ordered; the order is the paint order (later paints on top)
//!
//! # Design Decisions
//!
//! 1. Nodes live in an arena indexed by `NodeId` for O(1) lookups, the same
//!    way the dependency graph indexes its nodes.
//!
//! 2. Detaching a node removes its whole subtree from the arena. Handles to
//!    removed nodes stay valid values but resolve to nothing, so late
//!    animation callbacks on removed nodes are harmless no-ops.
//!
//! 3. `select_enter` is the "create sub-element only if absent" guard that
//!    makes glyph drawing idempotent.

mod node;
mod surface;

pub use node::{AttrValue, NodeId, VisualNode};
pub use surface::Surface;
