//! Stage
//!
//! The stage is the single-threaded host every chart renders into. It owns
//! the render surface, the timer queue, the running tweens and the named
//! transition chains, and it owns the clock: time only moves when the host
//! calls `advance`.
//!
//! # How Time Advances
//!
//! 1. Timers due before the target time fire one by one, in order.
//!
//! 2. Before each timer fires, every tween is sampled at that timer's due
//!    time, so a callback always observes the attribute values of its own
//!    instant.
//!
//! 3. After the last due timer, tweens are sampled at the target time.
//!
//! # Reentrancy
//!
//! Callbacks receive `&mut Stage` and may do anything the host can do:
//! schedule timers, start or cancel transitions, run a reconcile. Nothing is
//! borrowed across a callback invocation, so a re-render from inside an
//! animation callback is always safe.

use std::time::Duration;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::sequencer::ActiveChain;
use super::timeline::{TimerId, Timeline};
use super::tween::{AttrTarget, Ease, Tween, TweenSet};
use crate::scene::{AttrValue, NodeId, Surface};

/// Upper bound on timers fired by `run_until_idle`, guarding against
/// callbacks that reschedule themselves forever.
const MAX_IDLE_STEPS: usize = 100_000;

/// Host for surfaces, timers, tweens and transition chains.
pub struct Stage {
    surface: Surface,
    now: Duration,
    timeline: Timeline<Stage>,
    tweens: TweenSet,
    pub(crate) chains: IndexMap<String, ActiveChain>,
}

impl Stage {
    /// Create a stage with an empty surface at time zero.
    pub fn new() -> Self {
        Self {
            surface: Surface::new(),
            now: Duration::ZERO,
            timeline: Timeline::new(),
            tweens: TweenSet::default(),
            chains: IndexMap::new(),
        }
    }

    /// Current stage time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Get the render surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Get the render surface for direct mutation.
    ///
    /// Detaching through the surface bypasses tween cleanup; prefer
    /// [`Stage::detach`].
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Schedule `callback` to run `delay` after the current time.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce(&mut Stage) + 'static,
    {
        self.timeline.schedule(self.now + delay, Box::new(callback))
    }

    /// Cancel a pending timer.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timeline.cancel(id)
    }

    /// Start building a tween of `node`'s attributes under `slot`.
    pub fn animate(&mut self, node: NodeId, slot: &str, duration: Duration) -> TweenBuilder<'_> {
        TweenBuilder {
            stage: self,
            node,
            slot: slot.to_owned(),
            duration,
            ease: Ease::default(),
            targets: SmallVec::new(),
            remove_on_end: false,
        }
    }

    /// Stop the tween running on `(node, slot)` at its current values.
    pub fn interrupt(&mut self, node: NodeId, slot: &str) -> bool {
        self.tweens.remove(node, slot).is_some()
    }

    /// Check whether a tween is running on `(node, slot)`.
    pub fn is_animating(&self, node: NodeId, slot: &str) -> bool {
        self.tweens.contains(node, slot)
    }

    /// Number of running tweens.
    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Detach a node and drop the tweens of everything removed with it.
    pub fn detach(&mut self, node: NodeId) -> usize {
        let removed = self.surface.detach(node);
        self.tweens.drop_nodes(&removed);
        removed.len()
    }

    /// Detach `node` after `delay`.
    ///
    /// A zero delay detaches synchronously, before this call returns.
    pub fn remove_after(&mut self, node: NodeId, delay: Duration) {
        if delay.is_zero() {
            self.detach(node);
        } else {
            self.schedule(delay, move |stage| {
                stage.detach(node);
            });
        }
    }

    /// Advance the clock by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.advance_to(self.now + dt);
    }

    /// Advance the clock to the absolute time `target`.
    ///
    /// Moving backwards is ignored.
    pub fn advance_to(&mut self, target: Duration) {
        while let Some((due, callback)) = self.timeline.pop_due(target) {
            self.now = self.now.max(due);
            self.sample_tweens();
            callback(self);
        }
        self.now = self.now.max(target);
        self.sample_tweens();
    }

    /// Advance until no timer, tween or transition is left.
    ///
    /// Returns the number of deadlines processed.
    pub fn run_until_idle(&mut self) -> usize {
        let mut steps = 0;
        while let Some(deadline) = self.next_deadline() {
            if steps == MAX_IDLE_STEPS {
                tracing::warn!(steps, "stage did not settle, giving up");
                break;
            }
            self.advance_to(deadline.max(self.now));
            steps += 1;
        }
        steps
    }

    /// Check whether nothing is scheduled or animating.
    pub fn is_idle(&self) -> bool {
        self.timeline.is_empty() && self.tweens.is_empty() && self.chains.is_empty()
    }

    /// Earliest time at which something is due.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        match (self.timeline.next_due(), self.tweens.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn schedule_at(
        &mut self,
        due: Duration,
        callback: Box<dyn FnOnce(&mut Stage)>,
    ) -> TimerId {
        self.timeline.schedule(due, callback)
    }

    fn sample_tweens(&mut self) {
        let finished = self.tweens.sample(&mut self.surface, self.now);
        for node in finished {
            self.detach(node);
        }
    }

    fn start_tween(&mut self, slot: &str, tween: Tween) {
        if tween.duration.is_zero() {
            self.tweens.remove(tween.node, slot);
            tween.apply(&mut self.surface, self.now);
            if tween.remove_on_end {
                self.detach(tween.node);
            }
            return;
        }
        self.tweens.insert(slot, tween);
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("now", &self.now)
            .field("nodes", &self.surface.node_count())
            .field("timers", &self.timeline.len())
            .field("tweens", &self.tweens.len())
            .field("chains", &self.chains.len())
            .finish()
    }
}

/// Builder for a tween started with [`Stage::animate`].
#[must_use = "a tween does nothing until `start` is called"]
pub struct TweenBuilder<'a> {
    stage: &'a mut Stage,
    node: NodeId,
    slot: String,
    duration: Duration,
    ease: Ease,
    targets: SmallVec<[(String, AttrValue); 4]>,
    remove_on_end: bool,
}

impl TweenBuilder<'_> {
    /// Animate attribute `name` towards `value`.
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.targets.push((name.to_owned(), value.into()));
        self
    }

    /// Set the easing curve.
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Detach the node once the tween completes.
    pub fn remove_on_end(mut self) -> Self {
        self.remove_on_end = true;
        self
    }

    /// Start the tween, interrupting any tween on the same `(node, slot)`.
    ///
    /// Start values are the node's current attribute values. A missing
    /// attribute starts at its target. A zero duration applies the targets
    /// immediately.
    pub fn start(self) {
        let TweenBuilder {
            stage,
            node,
            slot,
            duration,
            ease,
            targets,
            remove_on_end,
        } = self;

        if !stage.surface.contains(node) {
            return;
        }

        // Freeze the interrupted tween where it is before reading start values.
        stage.tweens.remove(node, &slot);

        let targets = targets
            .into_iter()
            .map(|(name, to)| {
                let from = stage.surface.attr(node, &name).cloned().unwrap_or_else(|| to.clone());
                AttrTarget { name, from, to }
            })
            .collect();

        let tween = Tween {
            node,
            started: stage.now,
            duration,
            ease,
            targets,
            remove_on_end,
        };
        stage.start_tween(&slot, tween);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn timers_fire_when_time_advances() {
        let mut stage = Stage::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        let log = fired.clone();
        stage.schedule(ms(100), move |stage| log.borrow_mut().push(stage.now()));

        stage.advance(ms(99));
        assert!(fired.borrow().is_empty());

        stage.advance(ms(1));
        assert_eq!(*fired.borrow(), vec![ms(100)]);
        assert!(stage.is_idle());
    }

    #[test]
    fn callbacks_see_tweens_sampled_at_their_instant() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "circle").unwrap();
        stage.surface_mut().set_attr(node, "r", 0.0);
        stage.animate(node, "appear", ms(100)).attr("r", 10.0).ease(Ease::Linear).start();

        let seen = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        stage.schedule(ms(40), move |stage| {
            *slot.borrow_mut() = stage.surface().attr(node, "r").and_then(AttrValue::as_number);
        });

        stage.advance(ms(1000));
        let r = seen.borrow().unwrap();
        assert!((r - 4.0).abs() < 1e-9);
        assert_eq!(stage.surface().attr(node, "r"), Some(&AttrValue::Number(10.0)));
    }

    #[test]
    fn restarting_a_slot_interrupts_the_previous_tween() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "circle").unwrap();
        stage.surface_mut().set_attr(node, "r", 0.0);

        stage.animate(node, "appear", ms(100)).attr("r", 10.0).ease(Ease::Linear).start();
        stage.advance(ms(50));
        stage.animate(node, "appear", ms(100)).attr("r", 0.0).ease(Ease::Linear).start();
        assert_eq!(stage.tween_count(), 1);

        stage.advance(ms(50));
        assert_eq!(stage.surface().attr(node, "r"), Some(&AttrValue::Number(2.5)));
    }

    #[test]
    fn zero_duration_tween_applies_immediately() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "circle").unwrap();

        stage.animate(node, "appear", Duration::ZERO).attr("opacity", 0.5).start();
        assert_eq!(stage.surface().attr(node, "opacity"), Some(&AttrValue::Number(0.5)));
        assert_eq!(stage.tween_count(), 0);
    }

    #[test]
    fn remove_after_zero_detaches_synchronously() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "g").unwrap();

        stage.remove_after(node, Duration::ZERO);
        assert!(!stage.surface().contains(node));
    }

    #[test]
    fn remove_after_delay_detaches_later_and_drops_tweens() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "g").unwrap();
        stage.animate(node, "exit", ms(500)).attr("scale", 0.0).start();

        stage.remove_after(node, ms(200));
        stage.advance(ms(199));
        assert!(stage.surface().contains(node));

        stage.advance(ms(1));
        assert!(!stage.surface().contains(node));
        assert_eq!(stage.tween_count(), 0);
        assert!(stage.is_idle());
    }

    #[test]
    fn run_until_idle_drains_everything() {
        let mut stage = Stage::new();
        let root = stage.surface().root();
        let node = stage.surface_mut().append(root, "g").unwrap();
        stage.animate(node, "exit", ms(300)).attr("scale", 0.0).remove_on_end().start();
        stage.schedule(ms(700), |stage| {
            stage.schedule(ms(100), |_| {});
        });

        stage.run_until_idle();
        assert!(stage.is_idle());
        assert_eq!(stage.now(), ms(800));
        assert!(!stage.surface().contains(node));
    }
}
