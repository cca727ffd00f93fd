//! Timer Queue
//!
//! A virtual-time queue of one-shot callbacks. The queue does not own a
//! clock: the host pops whatever is due up to the time it has advanced to.
//!
//! # Ordering
//!
//! Timers fire in order of due time. Timers with the same due time fire in
//! the order they were scheduled, which keeps chained animations
//! deterministic when several steps end on the same instant.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A one-shot timer callback receiving the host context.
pub type TimerCallback<C> = Box<dyn FnOnce(&mut C)>;

/// Unique identifier for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered queue of pending timers.
pub struct Timeline<C> {
    /// (due, sequence, id), min-first.
    queue: BinaryHeap<Reverse<(Duration, u64, u64)>>,

    /// Pending callbacks. Cancelled timers are removed here and skipped
    /// lazily when they surface in the heap.
    pending: HashMap<TimerId, TimerCallback<C>>,

    sequence: u64,
}

impl<C> Timeline<C> {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            pending: HashMap::new(),
            sequence: 0,
        }
    }

    /// Schedule `callback` to fire at the absolute time `due`.
    pub fn schedule(&mut self, due: Duration, callback: TimerCallback<C>) -> TimerId {
        let id = TimerId::new();
        self.sequence += 1;
        self.queue.push(Reverse((due, self.sequence, id.0)));
        self.pending.insert(id, callback);
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Check whether a timer is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Remove and return the earliest timer due at or before `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, TimerCallback<C>)> {
        self.discard_cancelled();
        let Reverse((due, _, raw)) = *self.queue.peek()?;
        if due > until {
            return None;
        }
        self.queue.pop();
        self.pending.remove(&TimerId(raw)).map(|callback| (due, callback))
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, _, raw))) = self.queue.peek() {
            if self.pending.contains_key(&TimerId(*raw)) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Timeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(timeline: &mut Timeline<Vec<&'static str>>, until: Duration) -> Vec<&'static str> {
        let mut log = Vec::new();
        while let Some((_, callback)) = timeline.pop_due(until) {
            callback(&mut log);
        }
        log
    }

    #[test]
    fn fires_in_due_order() {
        let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
        timeline.schedule(ms(30), Box::new(|log: &mut Vec<_>| log.push("c")));
        timeline.schedule(ms(10), Box::new(|log: &mut Vec<_>| log.push("a")));
        timeline.schedule(ms(20), Box::new(|log: &mut Vec<_>| log.push("b")));

        assert_eq!(drain(&mut timeline, ms(25)), vec!["a", "b"]);
        assert_eq!(timeline.next_due(), Some(ms(30)));
        assert_eq!(drain(&mut timeline, ms(30)), vec!["c"]);
        assert!(timeline.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
        timeline.schedule(ms(10), Box::new(|log: &mut Vec<_>| log.push("first")));
        timeline.schedule(ms(10), Box::new(|log: &mut Vec<_>| log.push("second")));

        assert_eq!(drain(&mut timeline, ms(10)), vec!["first", "second"]);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timeline: Timeline<Vec<&'static str>> = Timeline::new();
        let id = timeline.schedule(ms(10), Box::new(|log: &mut Vec<_>| log.push("cancelled")));
        timeline.schedule(ms(20), Box::new(|log: &mut Vec<_>| log.push("kept")));

        assert!(timeline.cancel(id));
        assert!(!timeline.cancel(id));
        assert!(!timeline.is_pending(id));
        assert_eq!(timeline.next_due(), Some(ms(20)));
        assert_eq!(drain(&mut timeline, ms(100)), vec!["kept"]);
    }
}
