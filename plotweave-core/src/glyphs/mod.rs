//! Reference Glyphs
//!
//! Two ready-made [`Glyph`](crate::join::Glyph) implementations: a dot for
//! plain samples and an arrow for displacement vectors. Both follow the same
//! layout inside the node the reconciler hands them:
//!
//! ```text
//! g.point            (owned by the reconciler, carries `translate`)
//! └── g.symbol       (carries `scale`, shrunk to 0 on exit)
//!     └── circle.dot | path.arrow
//! ```

mod arrow;
mod point;

use std::time::Duration;

pub use arrow::{ArrowGlyph, ArrowOpacity, ARROWHEAD_ID};
pub use point::PointGlyph;

use crate::animation::Stage;
use crate::scene::NodeId;

/// Tween slot for a mark's own appearance.
pub const APPEAR_SLOT: &str = "appear";

/// Tween slot for the exit shrink.
pub const EXIT_SLOT: &str = "exit";

/// Class of the wrapper between the reconciler's node and the mark.
pub const SYMBOL_CLASS: &str = "symbol";

/// Shrink the symbol of `node`, fade `mark_class` out and detach `node`
/// once `duration` has elapsed.
pub(crate) fn fade_out(
    stage: &mut Stage,
    node: NodeId,
    mark_class: &str,
    fade_attr: &str,
    duration: Duration,
) {
    if let Some(symbol) = stage.surface().select_child(node, SYMBOL_CLASS) {
        if stage.surface().attr(symbol, "scale").is_none() {
            stage.surface_mut().set_attr(symbol, "scale", 1.0);
        }
        stage.animate(symbol, EXIT_SLOT, duration).attr("scale", 0.0).start();

        if let Some(mark) = stage.surface().select_child(symbol, mark_class) {
            stage.animate(mark, APPEAR_SLOT, duration).attr(fade_attr, 0.0).start();
        }
    }
    stage.remove_after(node, duration);
}
