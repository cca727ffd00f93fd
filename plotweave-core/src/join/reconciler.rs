//! Keyed Reconciler
//!
//! The reconciler binds a dataset to a persistent scene, one visual node per
//! key, preserving node identity for keys that survive between renders.
//!
//! # Algorithm
//!
//! Every call computes three key sets eagerly:
//!
//! - enter  = new keys - scene keys
//! - update = new keys ∩ scene keys
//! - exit   = scene keys - new keys
//!
//! and then processes them in this order:
//!
//! 1. Walk the dataset. Updated keys are redrawn and their node is tweened
//!    to its new position; entered keys get a fresh node placed at its final
//!    position before the glyph animates it in.
//! 2. Exited keys leave the scene map first, then the glyph animates them
//!    out. Their start-of-exit position is the previous frame's.
//!
//! The scene's key set after a call is exactly the dataset's key set. A key
//! that reappears while its old node is still animating out gets a new,
//! independent node: the old node is no longer in the scene and nothing
//! revives it.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::datum::Datum;
use super::glyph::{Glyph, RenderArgs};
use crate::animation::Stage;
use crate::scene::{AttrValue, NodeId};

/// Class carried by every node the reconciler creates.
pub const NODE_CLASS: &str = "point";

/// Tween slot used for node positions.
pub const POSITION_SLOT: &str = "position";

/// Attribute holding a node's translation.
pub const TRANSLATE_ATTR: &str = "translate";

/// The live mapping from key to visual node for one chart.
pub type Scene<K> = IndexMap<K, NodeId>;

/// Keys that took each path through one reconcile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport<K> {
    pub entered: Vec<K>,
    pub updated: Vec<K>,
    pub exited: Vec<K>,
}

impl<K> ReconcileReport<K> {
    fn new() -> Self {
        Self {
            entered: Vec::new(),
            updated: Vec::new(),
            exited: Vec::new(),
        }
    }

    /// True when nothing entered or exited.
    pub fn is_stable(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Owner of one chart's scene.
#[derive(Debug)]
pub struct Reconciler<K> {
    /// Node under which visual nodes are appended.
    layer: NodeId,

    scene: Scene<K>,

    /// Whether the glyph's one-time `init` has run.
    initialized: bool,
}

impl<K> Reconciler<K>
where
    K: Clone + Eq + std::hash::Hash + std::fmt::Debug,
{
    /// Create a reconciler drawing under `layer`.
    pub fn new(layer: NodeId) -> Self {
        Self {
            layer,
            scene: IndexMap::new(),
            initialized: false,
        }
    }

    /// The layer node.
    pub fn layer(&self) -> NodeId {
        self.layer
    }

    /// The live scene.
    pub fn scene(&self) -> &Scene<K> {
        &self.scene
    }

    /// The node bound to `key`, if the key is live.
    pub fn node(&self, key: &K) -> Option<NodeId> {
        self.scene.get(key).copied()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    /// Bind `dataset` to the scene.
    ///
    /// When two datums share a key the last one wins and the key keeps the
    /// position of its first occurrence.
    pub fn reconcile<D, G>(
        &mut self,
        stage: &mut Stage,
        dataset: &[D],
        glyph: &G,
        args: &RenderArgs<'_>,
    ) -> ReconcileReport<K>
    where
        D: Datum<Key = K>,
        G: Glyph<D> + ?Sized,
    {
        if !self.initialized {
            glyph.init(stage.surface_mut(), self.layer);
            self.initialized = true;
        }

        let mut incoming: IndexMap<K, &D> = IndexMap::with_capacity(dataset.len());
        for datum in dataset {
            incoming.insert(datum.key(), datum);
        }

        let exiting: Vec<(K, NodeId)> = self
            .scene
            .iter()
            .filter(|(key, _)| !incoming.contains_key(*key))
            .map(|(key, node)| (key.clone(), *node))
            .collect();

        let mut report = ReconcileReport::new();
        let mut next: Scene<K> = IndexMap::with_capacity(incoming.len());

        for (key, datum) in incoming {
            let (x, y) = args.position(datum);
            let live = self
                .scene
                .get(&key)
                .copied()
                .filter(|node| stage.surface().contains(*node));

            match live {
                Some(node) => {
                    glyph.draw(stage, node, datum, args);
                    stage
                        .animate(node, POSITION_SLOT, args.durations.update)
                        .attr(TRANSLATE_ATTR, AttrValue::point(x, y))
                        .start();
                    report.updated.push(key.clone());
                    next.insert(key, node);
                }
                None => {
                    let Some(node) = stage
                        .surface_mut()
                        .append_with_class(self.layer, "g", NODE_CLASS)
                    else {
                        tracing::warn!(
                            layer = %self.layer,
                            "reconcile layer is detached, skipping enter"
                        );
                        continue;
                    };
                    stage.surface_mut().set_attr(node, TRANSLATE_ATTR, AttrValue::point(x, y));
                    glyph.draw(stage, node, datum, args);
                    report.entered.push(key.clone());
                    next.insert(key, node);
                }
            }
        }

        // Swap in the new scene before any exit runs, so a stale key can
        // never match a node that is animating out.
        self.scene = next;

        for (key, node) in exiting {
            tracing::trace!(?key, %node, "exit");
            glyph.remove(stage, node, args);
            report.exited.push(key);
        }

        tracing::debug!(
            entered = report.entered.len(),
            updated = report.updated.len(),
            exited = report.exited.len(),
            "reconciled scene"
        );
        report
    }

    /// Reconcile against an empty dataset, removing every node.
    pub fn clear<D, G>(
        &mut self,
        stage: &mut Stage,
        glyph: &G,
        args: &RenderArgs<'_>,
    ) -> ReconcileReport<K>
    where
        D: Datum<Key = K>,
        G: Glyph<D> + ?Sized,
    {
        self.reconcile::<D, G>(stage, &[], glyph, args)
    }

    /// The set of live keys.
    pub fn keys(&self) -> HashSet<K> {
        self.scene.keys().cloned().collect()
    }
}
