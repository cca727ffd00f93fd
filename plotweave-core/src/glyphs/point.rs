//! Dot glyph.

use std::time::Duration;

use super::{fade_out, APPEAR_SLOT, SYMBOL_CLASS};
use crate::animation::Stage;
use crate::join::{Datum, Glyph, RenderArgs};
use crate::scene::NodeId;

const DOT_CLASS: &str = "dot";

/// A filled circle that grows in on enter and shrinks out on exit.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGlyph {
    /// Radius in range units.
    pub radius: f64,

    /// Fill opacity once fully entered.
    pub opacity: f64,

    /// Overrides the chart's exit duration. Zero clears instantly.
    pub exit_duration: Option<Duration>,
}

impl PointGlyph {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_exit_duration(mut self, duration: Duration) -> Self {
        self.exit_duration = Some(duration);
        self
    }
}

impl Default for PointGlyph {
    fn default() -> Self {
        Self {
            radius: 4.0,
            opacity: 0.7,
            exit_duration: None,
        }
    }
}

impl<D: Datum + ?Sized> Glyph<D> for PointGlyph {
    fn draw(&self, stage: &mut Stage, node: NodeId, _datum: &D, args: &RenderArgs<'_>) {
        let Some((symbol, _)) = stage.surface_mut().select_enter(node, SYMBOL_CLASS, "g") else {
            return;
        };
        let Some((dot, created)) = stage
            .surface_mut()
            .select_enter(symbol, DOT_CLASS, "circle")
        else {
            return;
        };

        let duration = if created {
            stage.surface_mut().set_attr(dot, "r", 0.0);
            stage.surface_mut().set_attr(dot, "fill-opacity", 0.0);
            args.durations.enter
        } else {
            args.durations.update
        };

        stage
            .animate(dot, APPEAR_SLOT, duration)
            .attr("r", self.radius)
            .attr("fill-opacity", self.opacity)
            .start();
    }

    fn remove(&self, stage: &mut Stage, node: NodeId, args: &RenderArgs<'_>) {
        let duration = self.exit_duration.unwrap_or(args.durations.exit);
        fade_out(stage, node, DOT_CLASS, "fill-opacity", duration);
    }
}
