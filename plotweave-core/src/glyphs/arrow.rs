//! Arrow glyph for displacement vectors.
//!
//! The arrow is drawn from the node's translation along the datum's vector.
//! Its length and angle are measured in range units, so a flipped y range
//! flips the arrow with it.

use super::{fade_out, APPEAR_SLOT, SYMBOL_CLASS};
use crate::animation::Stage;
use crate::join::{Glyph, RenderArgs, VectorDatum};
use crate::scene::{NodeId, Surface};

const ARROW_CLASS: &str = "arrow";

/// Element id of the shared arrowhead marker.
pub const ARROWHEAD_ID: &str = "arrowhead";

/// How an arrow's opacity is derived from its datum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowOpacity {
    Constant(f64),

    /// `min(cap, gain * sqrt(weight))`. Arrows starting from improbable
    /// points stay faint.
    ByWeight { gain: f64, cap: f64 },
}

impl ArrowOpacity {
    pub fn resolve(&self, weight: f64) -> f64 {
        match *self {
            ArrowOpacity::Constant(value) => value,
            ArrowOpacity::ByWeight { gain, cap } => (gain * weight.max(0.0).sqrt()).min(cap),
        }
    }
}

impl Default for ArrowOpacity {
    fn default() -> Self {
        ArrowOpacity::Constant(1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrowGlyph {
    pub opacity: ArrowOpacity,
    pub exit_duration: Option<std::time::Duration>,
}

impl ArrowGlyph {
    pub fn new(opacity: ArrowOpacity) -> Self {
        Self {
            opacity,
            exit_duration: None,
        }
    }

    /// Vector length and angle in degrees, in range units.
    fn geometry<D: VectorDatum + ?Sized>(datum: &D, args: &RenderArgs<'_>) -> (f64, f64) {
        let (x0, y0) = args.position(datum);
        let x1 = args.x_scale.apply(datum.x() + datum.dx());
        let y1 = args.y_scale.apply(datum.y() + datum.dy());
        let (px, py) = (x1 - x0, y1 - y0);
        (px.hypot(py), py.atan2(px).to_degrees())
    }
}

impl<D: VectorDatum + ?Sized> Glyph<D> for ArrowGlyph {
    fn init(&self, surface: &mut Surface, layer: NodeId) {
        let host = marker_host(surface, layer);
        let Some((defs, _)) = surface.select_enter(host, "defs", "defs") else {
            return;
        };
        if let Some((marker, true)) = surface.select_enter(defs, ARROWHEAD_ID, "marker") {
            surface.set_attr(marker, "id", ARROWHEAD_ID);
            surface.set_attr(marker, "markerWidth", 6.0);
            surface.set_attr(marker, "markerHeight", 6.0);
            surface.set_attr(marker, "orient", "auto");
            if let Some(tip) = surface.append(marker, "path") {
                surface.set_attr(tip, "d", "M0,0 L6,3 L0,6 Z");
            }
        }
    }

    fn draw(&self, stage: &mut Stage, node: NodeId, datum: &D, args: &RenderArgs<'_>) {
        let Some((symbol, _)) = stage.surface_mut().select_enter(node, SYMBOL_CLASS, "g") else {
            return;
        };
        let Some((arrow, created)) = stage
            .surface_mut()
            .select_enter(symbol, ARROW_CLASS, "path")
        else {
            return;
        };

        let (length, angle) = Self::geometry(datum, args);
        let duration = if created {
            let surface = stage.surface_mut();
            surface.set_attr(arrow, "marker-end", format!("url(#{ARROWHEAD_ID})"));
            surface.set_attr(arrow, "length", 0.0);
            surface.set_attr(arrow, "angle", angle);
            surface.set_attr(arrow, "opacity", 0.0);
            args.durations.enter
        } else {
            args.durations.update
        };

        stage
            .animate(arrow, APPEAR_SLOT, duration)
            .attr("length", length)
            .attr("angle", angle)
            .attr("opacity", self.opacity.resolve(datum.weight()))
            .start();
    }

    fn remove(&self, stage: &mut Stage, node: NodeId, args: &RenderArgs<'_>) {
        let duration = self.exit_duration.unwrap_or(args.durations.exit);
        fade_out(stage, node, ARROW_CLASS, "opacity", duration);
    }
}

/// The nearest `svg` ancestor of `layer`, so that every layer of one chart
/// shares a single marker. Falls back to `layer` outside an svg.
fn marker_host(surface: &Surface, layer: NodeId) -> NodeId {
    let mut current = Some(layer);
    while let Some(id) = current {
        let Some(node) = surface.get(id) else {
            break;
        };
        if node.tag() == "svg" {
            return id;
        }
        current = node.parent();
    }
    layer
}
