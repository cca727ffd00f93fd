//! Data Records
//!
//! A datum is an application record with a stable identity key. The
//! reconciler reads datums, it never mutates them.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A record that can be bound to a visual node.
pub trait Datum {
    /// Identity across renders.
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;

    /// Horizontal position in domain units.
    fn x(&self) -> f64;

    /// Vertical position in domain units.
    fn y(&self) -> f64;
}

/// A datum that also carries a displacement vector.
pub trait VectorDatum: Datum {
    fn dx(&self) -> f64;

    fn dy(&self) -> f64;

    /// Relative importance of the vector, 1 unless the source says otherwise.
    fn weight(&self) -> f64 {
        1.0
    }
}

/// A keyed 2-D sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point2<K> {
    pub key: K,
    pub x: f64,
    pub y: f64,
}

impl<K> Point2<K> {
    pub fn new(key: K, x: f64, y: f64) -> Self {
        Self { key, x, y }
    }
}

impl<K: Clone + Eq + Hash + Debug> Datum for Point2<K> {
    type Key = K;

    fn key(&self) -> K {
        self.key.clone()
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

/// A keyed 2-D vector anchored at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow2<K> {
    pub key: K,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl<K: Clone + Eq + Hash + Debug> Datum for Arrow2<K> {
    type Key = K;

    fn key(&self) -> K {
        self.key.clone()
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl<K: Clone + Eq + Hash + Debug> VectorDatum for Arrow2<K> {
    fn dx(&self) -> f64 {
        self.dx
    }

    fn dy(&self) -> f64 {
        self.dy
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Pair records of `source` and `target` by key and build the displacement
/// arrows from each source position to its target position.
///
/// Records are usually index-aligned, so the record at the same index is
/// tried first and a key lookup is the fallback. Source records without a
/// target are skipped. The arrow's weight is the target's weight when the
/// target is itself a vector, 1 otherwise.
pub fn displacements<S, T>(source: &[S], target: &[T]) -> Vec<Arrow2<S::Key>>
where
    S: Datum,
    T: Datum<Key = S::Key>,
{
    let mut by_key: Option<HashMap<S::Key, &T>> = None;

    source
        .iter()
        .enumerate()
        .filter_map(|(i, d)| {
            let key = d.key();
            let aligned = target.get(i).filter(|t| t.key() == key);
            let matched = match aligned {
                Some(t) => Some(t),
                None => by_key
                    .get_or_insert_with(|| target.iter().map(|t| (t.key(), t)).collect())
                    .get(&key)
                    .copied(),
            }?;
            Some(Arrow2 {
                key,
                x: d.x(),
                y: d.y(),
                dx: matched.x() - d.x(),
                dy: matched.y() - d.y(),
                weight: 1.0,
            })
        })
        .collect()
}

/// Like [`displacements`], carrying each target's weight onto its arrow.
pub fn weighted_displacements<S, T>(source: &[S], target: &[T]) -> Vec<Arrow2<S::Key>>
where
    S: Datum,
    T: VectorDatum<Key = S::Key>,
{
    let weights: HashMap<S::Key, f64> = target.iter().map(|t| (t.key(), t.weight())).collect();
    let mut arrows = displacements(source, target);
    for arrow in &mut arrows {
        if let Some(w) = weights.get(&arrow.key) {
            arrow.weight = *w;
        }
    }
    arrows
}
