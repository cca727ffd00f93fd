//! Chart Assembly
//!
//! A chart ties one container element, a scale pair and a reconciler
//! together and exposes a single `render(dataset)` entry point. Controls and
//! transition callbacks call it with whatever dataset the current parameters
//! produce.

mod scatter;

pub use scatter::{ScatterPlot, AXIS_SLOT};
