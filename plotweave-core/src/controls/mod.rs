//! Interactive Controls
//!
//! Headless input widgets whose events drive re-renders. A control never
//! touches the stage itself; its listeners decide what a value change means
//! (typically a `reconcile` call or a named transition).

mod slider;

pub use slider::{ListenerId, Slider, SliderController};
