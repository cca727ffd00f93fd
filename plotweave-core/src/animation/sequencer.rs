//! Transition Sequencer
//!
//! Named, cancellable chains of timed steps. A chain drives multi-step
//! "story" animations such as data, then noisy data, then denoised data.
//!
//! # How Chains Run
//!
//! 1. `Stage::start_transition` cancels any chain running under the same
//!    name. The cancelled chain's pending timer is dropped, the tweens of its
//!    in-flight step are frozen, and none of its remaining callbacks run.
//!
//! 2. The first step starts immediately: its `start` callbacks run, its
//!    style targets begin tweening, and a timer is set for its end.
//!
//! 3. When a step ends its `end` callbacks run, then the next step starts
//!    at the same instant.
//!
//! 4. A zero-duration step runs `start` and `end` back to back without
//!    touching the timer queue, so a chain of zero-duration steps completes
//!    before `start_transition` returns.
//!
//! Any callback may start a chain under the same name. The old chain stops
//! right there: later callbacks of the same step and all later steps are
//! dropped.
//!
//! Chains with different names never interact.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use smallvec::SmallVec;

use super::stage::Stage;
use super::timeline::TimerId;
use crate::scene::{AttrValue, NodeId};

/// A callback run once when a step starts or ends.
pub type StepCallback = Box<dyn FnOnce(&mut Stage)>;

/// Identifies one run of a named chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(u64);

impl ChainId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A style change applied over a step's duration.
#[derive(Debug, Clone)]
struct StyleTarget {
    node: NodeId,
    attr: String,
    value: AttrValue,
}

/// One timed step of a chain.
pub struct TransitionStep {
    duration: Duration,
    on_start: Vec<StepCallback>,
    on_end: Vec<StepCallback>,
    styles: SmallVec<[StyleTarget; 2]>,
}

impl TransitionStep {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            on_start: Vec::new(),
            on_end: Vec::new(),
            styles: SmallVec::new(),
        }
    }

    /// The step's duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for TransitionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionStep")
            .field("duration", &self.duration)
            .field("on_start", &self.on_start.len())
            .field("on_end", &self.on_end.len())
            .field("styles", &self.styles.len())
            .finish()
    }
}

/// Builder for a named chain of transition steps.
///
/// # Example
///
/// ```rust,ignore
/// let chain = TransitionChain::named("story", Duration::from_millis(1000))
///     .on_start(|stage| { /* show the clean samples */ })
///     .on_end(|stage| { /* draw displacement arrows */ })
///     .transition(Duration::from_millis(500))
///     .on_end(|stage| { /* show noisy data */ });
/// stage.start_transition(chain);
/// ```
#[must_use = "a chain does nothing until passed to `Stage::start_transition`"]
#[derive(Debug)]
pub struct TransitionChain {
    name: String,
    steps: Vec<TransitionStep>,
}

impl TransitionChain {
    /// Start a chain whose first step lasts `duration`.
    pub fn named(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            steps: vec![TransitionStep::new(duration)],
        }
    }

    /// The chain's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The chain's steps, in order.
    pub fn steps(&self) -> &[TransitionStep] {
        &self.steps
    }

    /// Run `callback` when the current step starts.
    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Stage) + 'static,
    {
        self.current().on_start.push(Box::new(callback));
        self
    }

    /// Run `callback` when the current step ends.
    pub fn on_end<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Stage) + 'static,
    {
        self.current().on_end.push(Box::new(callback));
        self
    }

    /// Tween `node`'s `attr` towards `value` over the current step.
    pub fn tween(mut self, node: NodeId, attr: &str, value: impl Into<AttrValue>) -> Self {
        self.current().styles.push(StyleTarget {
            node,
            attr: attr.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Append a follow-on step that starts when the current one ends.
    pub fn transition(mut self, duration: Duration) -> Self {
        self.steps.push(TransitionStep::new(duration));
        self
    }

    fn current(&mut self) -> &mut TransitionStep {
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }
}

/// A chain registered on a stage.
pub(crate) struct ActiveChain {
    id: ChainId,
    steps: VecDeque<TransitionStep>,
    timer: Option<TimerId>,
    /// Nodes tweened by the in-flight step.
    tweened: SmallVec<[NodeId; 2]>,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    End,
}

impl Stage {
    /// Start a chain, replacing any chain running under the same name.
    pub fn start_transition(&mut self, chain: TransitionChain) -> ChainId {
        let TransitionChain { name, steps } = chain;
        self.cancel_transition(&name);

        let id = ChainId::new();
        tracing::debug!(name = %name, steps = steps.len(), "starting transition chain");
        self.chains.insert(
            name.clone(),
            ActiveChain {
                id,
                steps: steps.into(),
                timer: None,
                tweened: SmallVec::new(),
            },
        );
        self.drive_chain(&name, id, Phase::Start);
        id
    }

    /// Cancel the chain running under `name`.
    ///
    /// Cancellation is silent: no pending callback of the chain runs.
    /// Returns false if no chain was running.
    pub fn cancel_transition(&mut self, name: &str) -> bool {
        let Some(chain) = self.chains.shift_remove(name) else {
            return false;
        };
        tracing::debug!(name, remaining = chain.steps.len(), "cancelling transition chain");
        if let Some(timer) = chain.timer {
            self.cancel_timer(timer);
        }
        for node in chain.tweened {
            self.interrupt(node, name);
        }
        true
    }

    /// Check whether a chain is running under `name`.
    pub fn transition_active(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    /// The run currently registered under `name`, if any.
    pub fn transition_id(&self, name: &str) -> Option<ChainId> {
        self.chains.get(name).map(|chain| chain.id)
    }

    fn chain_is_current(&self, name: &str, id: ChainId) -> bool {
        self.transition_id(name) == Some(id)
    }

    fn drive_chain(&mut self, name: &str, id: ChainId, mut phase: Phase) {
        loop {
            if !self.chain_is_current(name, id) {
                return;
            }
            match phase {
                Phase::Start => {
                    let Some(chain) = self.chains.get_mut(name) else {
                        return;
                    };
                    let Some(step) = chain.steps.front_mut() else {
                        self.chains.shift_remove(name);
                        tracing::debug!(name, "transition chain finished");
                        return;
                    };
                    let callbacks = std::mem::take(&mut step.on_start);
                    let styles = std::mem::take(&mut step.styles);
                    let duration = step.duration;

                    for callback in callbacks {
                        callback(self);
                        if !self.chain_is_current(name, id) {
                            return;
                        }
                    }

                    let mut tweened: SmallVec<[NodeId; 2]> = SmallVec::new();
                    for style in styles {
                        self.animate(style.node, name, duration)
                            .attr(&style.attr, style.value)
                            .start();
                        if !tweened.contains(&style.node) {
                            tweened.push(style.node);
                        }
                    }

                    if duration.is_zero() {
                        phase = Phase::End;
                        continue;
                    }

                    let owned = name.to_owned();
                    let due = self.now() + duration;
                    let end = move |stage: &mut Stage| stage.drive_chain(&owned, id, Phase::End);
                    let timer = self.schedule_at(due, Box::new(end));
                    if let Some(chain) = self.chains.get_mut(name) {
                        chain.timer = Some(timer);
                        chain.tweened = tweened;
                    }
                    return;
                }
                Phase::End => {
                    let Some(chain) = self.chains.get_mut(name) else {
                        return;
                    };
                    chain.timer = None;
                    chain.tweened.clear();
                    let Some(step) = chain.steps.pop_front() else {
                        self.chains.shift_remove(name);
                        return;
                    };

                    for callback in step.on_end {
                        callback(self);
                        if !self.chain_is_current(name, id) {
                            return;
                        }
                    }
                    phase = Phase::Start;
                }
            }
        }
    }
}
