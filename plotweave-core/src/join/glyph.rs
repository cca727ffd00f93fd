//! Glyph Contract
//!
//! A glyph knows how to draw one datum into the visual node the reconciler
//! bound it to, and how to take that node away again.
//!
//! # Implementation contract
//!
//! - `draw` is create-or-update. It must look for its sub-elements before
//!   appending them (`Surface::select_enter`) so that drawing an already
//!   drawn node updates it in place.
//! - `draw` must animate under a fixed tween slot so a redraw interrupts the
//!   node's previous animation instead of racing it.
//! - `remove` must always end with the node detached, even when the exit
//!   duration is zero (`Stage::remove_after` takes care of both cases).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::datum::Datum;
use crate::animation::Stage;
use crate::scale::Scale;
use crate::scene::{NodeId, Surface};

/// Durations of the three reconciliation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Durations {
    #[serde(rename = "enter_ms", with = "millis")]
    pub enter: Duration,
    #[serde(rename = "update_ms", with = "millis")]
    pub update: Duration,
    #[serde(rename = "exit_ms", with = "millis")]
    pub exit: Duration,
}

impl Durations {
    /// The same duration for all three outcomes.
    pub fn uniform(duration: Duration) -> Self {
        Self {
            enter: duration,
            update: duration,
            exit: duration,
        }
    }

    /// No animation at all.
    pub fn instant() -> Self {
        Self::uniform(Duration::ZERO)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(500))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Everything a glyph needs to render one frame.
#[derive(Clone, Copy)]
pub struct RenderArgs<'a> {
    pub x_scale: &'a dyn Scale,
    pub y_scale: &'a dyn Scale,
    pub durations: Durations,
}

impl<'a> RenderArgs<'a> {
    pub fn new(x_scale: &'a dyn Scale, y_scale: &'a dyn Scale, durations: Durations) -> Self {
        Self {
            x_scale,
            y_scale,
            durations,
        }
    }

    /// Range-space position of a datum.
    pub fn position<D: Datum + ?Sized>(&self, datum: &D) -> (f64, f64) {
        (self.x_scale.apply(datum.x()), self.y_scale.apply(datum.y()))
    }
}

impl std::fmt::Debug for RenderArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderArgs")
            .field("x_domain", &self.x_scale.domain())
            .field("y_domain", &self.y_scale.domain())
            .field("durations", &self.durations)
            .finish()
    }
}

/// A drawable symbol for datums of type `D`.
pub trait Glyph<D: ?Sized> {
    /// One-time setup of shared resources for the chart's layer. Resources
    /// shared across layers may be placed on an ancestor such as the
    /// enclosing `svg`. Called at most once per reconciler, before the first
    /// draw.
    fn init(&self, _surface: &mut Surface, _layer: NodeId) {}

    /// Create or update the representation of `datum` inside `node`.
    fn draw(&self, stage: &mut Stage, node: NodeId, datum: &D, args: &RenderArgs<'_>);

    /// Animate `node` out and detach it.
    fn remove(&self, stage: &mut Stage, node: NodeId, args: &RenderArgs<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::Point2;
    use crate::scale::LinearScale;

    #[test]
    fn position_goes_through_both_scales() {
        let x = LinearScale::new().with_domain([0.0, 10.0]).with_range([0.0, 100.0]);
        let y = LinearScale::new().with_domain([0.0, 10.0]).with_range([100.0, 0.0]);
        let args = RenderArgs::new(&x, &y, Durations::default());

        assert_eq!(args.position(&Point2::new(0, 2.0, 2.0)), (20.0, 80.0));
    }

    #[test]
    fn durations_round_trip_as_milliseconds() {
        let json = r#"{"enter_ms":200,"exit_ms":0}"#;
        let durations: Durations = serde_json::from_str(json).unwrap();

        assert_eq!(durations.enter, Duration::from_millis(200));
        assert_eq!(durations.update, Duration::from_millis(500));
        assert_eq!(durations.exit, Duration::ZERO);
    }
}
