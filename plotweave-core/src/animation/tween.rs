//! Attribute Tweens
//!
//! A tween interpolates attributes of one node from the values they had
//! when the tween started to target values, over a fixed duration.
//!
//! Tweens are keyed by `(node, slot)`. Starting a tween on a key that is
//! already animating interrupts the running tween at its current values, so
//! a redraw never leaves two animations fighting over the same attributes.

use std::time::Duration;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::scene::{AttrValue, NodeId, Surface};

/// Easing curve applied to tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,

    /// Symmetric cubic ease, slow at both ends.
    #[default]
    CubicInOut,

    QuadOut,
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::CubicInOut => {
                let t2 = t * 2.0;
                if t2 <= 1.0 {
                    t2 * t2 * t2 / 2.0
                } else {
                    let u = t2 - 2.0;
                    (u * u * u + 2.0) / 2.0
                }
            }
            Ease::QuadOut => t * (2.0 - t),
        }
    }
}

/// One animated attribute.
#[derive(Debug, Clone)]
pub(crate) struct AttrTarget {
    pub(crate) name: String,
    pub(crate) from: AttrValue,
    pub(crate) to: AttrValue,
}

/// A running attribute animation.
#[derive(Debug, Clone)]
pub struct Tween {
    pub(crate) node: NodeId,
    pub(crate) started: Duration,
    pub(crate) duration: Duration,
    pub(crate) ease: Ease,
    pub(crate) targets: SmallVec<[AttrTarget; 4]>,
    pub(crate) remove_on_end: bool,
}

impl Tween {
    /// Time at which the tween completes.
    pub fn ends_at(&self) -> Duration {
        self.started + self.duration
    }

    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() || now >= self.ends_at() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    /// Write the attribute values for time `now`. Returns true once the
    /// tween has reached its end.
    pub(crate) fn apply(&self, surface: &mut Surface, now: Duration) -> bool {
        let t = self.progress(now);
        let eased = self.ease.apply(t);
        for target in &self.targets {
            let value = if t >= 1.0 {
                target.to.clone()
            } else {
                target.from.interpolate(&target.to, eased)
            };
            surface.set_attr(self.node, &target.name, value);
        }
        t >= 1.0
    }
}

/// All running tweens of a stage.
#[derive(Debug, Default)]
pub(crate) struct TweenSet {
    active: IndexMap<(NodeId, String), Tween>,
}

impl TweenSet {
    /// Insert a tween, returning the one it interrupted, if any.
    pub(crate) fn insert(&mut self, slot: &str, tween: Tween) -> Option<Tween> {
        self.active.insert((tween.node, slot.to_owned()), tween)
    }

    pub(crate) fn remove(&mut self, node: NodeId, slot: &str) -> Option<Tween> {
        self.active.shift_remove(&(node, slot.to_owned()))
    }

    pub(crate) fn contains(&self, node: NodeId, slot: &str) -> bool {
        self.active.contains_key(&(node, slot.to_owned()))
    }

    /// Drop every tween animating one of `nodes`.
    pub(crate) fn drop_nodes(&mut self, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }
        self.active.retain(|(node, _), _| !nodes.contains(node));
    }

    /// Apply every tween at time `now`.
    ///
    /// Finished tweens are removed. Returns the nodes whose finished tween
    /// asked for them to be detached.
    pub(crate) fn sample(&mut self, surface: &mut Surface, now: Duration) -> Vec<NodeId> {
        let mut to_detach = Vec::new();
        self.active.retain(|_, tween| {
            let finished = tween.apply(surface, now);
            if finished && tween.remove_on_end {
                to_detach.push(tween.node);
            }
            !finished
        });
        to_detach
    }

    /// Earliest completion time among running tweens.
    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.active.values().map(Tween::ends_at).min()
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
