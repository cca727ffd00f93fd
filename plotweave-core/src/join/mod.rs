//! Data Join
//!
//! Binding keyed datasets to the render surface: the datum traits, the
//! glyph plugin contract and the keyed reconciler that computes
//! enter/update/exit between renders.
//!
//! # Overview
//!
//! A chart owns one [`Reconciler`] per layer. On every render it hands the
//! full dataset to `reconcile`, which diffs it against the live [`Scene`]
//! and calls the chart's [`Glyph`] for each outcome:
//!
//! - enter: `draw` on a freshly created node
//! - update: `draw` again on the existing node, then a position tween
//! - exit: `remove`, which animates the node out and detaches it

mod datum;
mod glyph;
mod reconciler;

pub use datum::{displacements, weighted_displacements, Arrow2, Datum, Point2, VectorDatum};
pub use glyph::{Durations, Glyph, RenderArgs};
pub use reconciler::{ReconcileReport, Reconciler, Scene, NODE_CLASS, POSITION_SLOT, TRANSLATE_ATTR};
