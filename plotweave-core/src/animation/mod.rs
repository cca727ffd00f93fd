//! Animation
//!
//! Time-based visual change: a virtual-time timer queue, attribute tweens,
//! the `Stage` that hosts them, and the named transition sequencer.
//!
//! # Concepts
//!
//! ## Stage
//!
//! The stage owns the render surface and the clock. Everything that happens
//! "later" is a callback on the stage's timer queue, and the host decides
//! when time moves by calling `advance`.
//!
//! ## Tweens
//!
//! A tween animates attributes of one node. Tweens are keyed by node and
//! slot; starting a tween on a busy slot interrupts the previous one.
//!
//! ## Transition chains
//!
//! A chain is a named sequence of timed steps with `start` and `end`
//! callbacks. Starting a chain under a name that is already running cancels
//! the running chain without firing any of its pending callbacks.

mod sequencer;
mod stage;
mod timeline;
mod tween;

pub use sequencer::{ChainId, StepCallback, TransitionChain, TransitionStep};
pub use stage::{Stage, TweenBuilder};
pub use timeline::{TimerCallback, TimerId, Timeline};
pub use tween::{Ease, Tween};
