//! Slider Control
//!
//! A slider holds one numeric value inside `[min, max]`, snapped to a step.
//! It reports two kinds of events:
//!
//! - input: fired continuously while the value is being dragged
//! - change: fired once the user commits a value, on release
//!
//! # Latches
//!
//! Each event kind remembers the last value it reported and stays silent
//! while the value is unchanged. Dragging back and forth across the same
//! snapped value only reports real moves, and releasing on the value that
//! was last committed reports nothing.
//!
//! # Sharing
//!
//! Clones share state, so a controller and the code that reads the value
//! can each hold their own handle. Listeners are called after the lock is
//! released and may read the slider or even move it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Handle returned by `on_input` / `on_change`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type Listener = Arc<dyn Fn(f64) + Send + Sync>;

struct SliderState {
    value: f64,
    last_input: f64,
    last_change: f64,
    input_listeners: Vec<(ListenerId, Listener)>,
    change_listeners: Vec<(ListenerId, Listener)>,
}

/// A snapped numeric value with input and change events.
#[derive(Clone)]
pub struct Slider {
    min: f64,
    max: f64,
    step: f64,
    state: Arc<Mutex<SliderState>>,
}

impl Slider {
    /// Create a slider starting at `initial`, snapped into range.
    pub fn new(min: f64, max: f64, step: f64, initial: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(Error::InvalidSlider(format!("empty range [{min}, {max}]")));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidSlider(format!("step must be positive, got {step}")));
        }

        let value = snap_to(min, max, step, initial);
        Ok(Self {
            min,
            max,
            step,
            state: Arc::new(Mutex::new(SliderState {
                value,
                last_input: value,
                last_change: value,
                input_listeners: Vec::new(),
                change_listeners: Vec::new(),
            })),
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// The current value.
    pub fn value(&self) -> f64 {
        self.state.lock().value
    }

    /// Clamp `value` into range and round it to the nearest step.
    pub fn snap(&self, value: f64) -> f64 {
        snap_to(self.min, self.max, self.step, value)
    }

    /// Move the value as part of a drag.
    ///
    /// Returns whether input listeners were notified.
    pub fn input(&self, value: f64) -> bool {
        let listeners = {
            let mut state = self.state.lock();
            state.value = self.snap(value);
            if state.value == state.last_input {
                return false;
            }
            state.last_input = state.value;
            (state.value, snapshot(&state.input_listeners))
        };
        notify(listeners);
        true
    }

    /// Commit the current value.
    ///
    /// Returns whether change listeners were notified.
    pub fn commit(&self) -> bool {
        let listeners = {
            let mut state = self.state.lock();
            if state.value == state.last_change {
                return false;
            }
            state.last_change = state.value;
            (state.value, snapshot(&state.change_listeners))
        };
        tracing::debug!(value = listeners.0, "slider committed");
        notify(listeners);
        true
    }

    /// Drag to `value` and commit it.
    pub fn set(&self, value: f64) -> bool {
        let moved = self.input(value);
        self.commit() || moved
    }

    pub fn on_input<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.state.lock().input_listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.state.lock().change_listeners.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener of either kind. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let before = state.input_listeners.len() + state.change_listeners.len();
        state.input_listeners.retain(|(lid, _)| *lid != id);
        state.change_listeners.retain(|(lid, _)| *lid != id);
        before != state.input_listeners.len() + state.change_listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        let state = self.state.lock();
        state.input_listeners.len() + state.change_listeners.len()
    }
}

fn snap_to(min: f64, max: f64, step: f64, value: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    let steps = ((value.clamp(min, max) - min) / step).round();
    (min + steps * step).min(max)
}

fn snapshot(listeners: &[(ListenerId, Listener)]) -> Vec<Listener> {
    listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
}

fn notify((value, listeners): (f64, Vec<Listener>)) {
    for listener in listeners {
        listener(value);
    }
}

impl std::fmt::Debug for Slider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slider")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .field("value", &self.value())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Pointer-driven slider.
///
/// Maps a horizontal pointer position inside a track of `width` units onto
/// the slider's range.
#[derive(Debug, Clone)]
pub struct SliderController {
    slider: Slider,
    width: f64,
    dragging: bool,
}

impl SliderController {
    pub fn new(slider: Slider, width: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Error::InvalidSlider(format!("track width must be positive, got {width}")));
        }
        Ok(Self {
            slider,
            width,
            dragging: false,
        })
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    /// Slider value under pointer position `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        let t = (x / self.width).clamp(0.0, 1.0);
        self.slider.snap(self.slider.min() + t * (self.slider.max() - self.slider.min()))
    }

    /// Pointer went down at `x`.
    pub fn press(&mut self, x: f64) -> bool {
        self.dragging = true;
        self.slider.input(self.value_at(x))
    }

    /// Pointer moved to `x`. Ignored unless pressed.
    pub fn drag(&mut self, x: f64) -> bool {
        if !self.dragging {
            return false;
        }
        self.slider.input(self.value_at(x))
    }

    /// Pointer released: commit whatever the drag left behind.
    pub fn release(&mut self) -> bool {
        if !std::mem::take(&mut self.dragging) {
            return false;
        }
        self.slider.commit()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(f64) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(Slider::new(1.0, 1.0, 0.5, 1.0), Err(Error::InvalidSlider(_))));
        assert!(matches!(Slider::new(0.0, 1.0, 0.0, 0.5), Err(Error::InvalidSlider(_))));
        assert!(matches!(Slider::new(0.0, f64::NAN, 1.0, 0.5), Err(Error::InvalidSlider(_))));
    }

    #[test]
    fn values_snap_into_range() {
        let slider = Slider::new(0.0, 10.0, 2.5, 3.0).unwrap();
        assert_eq!(slider.value(), 2.5);
        assert_eq!(slider.snap(-4.0), 0.0);
        assert_eq!(slider.snap(99.0), 10.0);
        assert_eq!(slider.snap(6.3), 7.5);
    }

    #[test]
    fn input_latch_suppresses_repeats() {
        let slider = Slider::new(0.0, 10.0, 1.0, 0.0).unwrap();
        let (count, listener) = counter();
        slider.on_input(listener);

        assert!(slider.input(3.2));
        assert!(!slider.input(2.9));
        assert!(slider.input(4.0));
        assert!(slider.input(3.0));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn change_fires_only_for_new_commits() {
        let slider = Slider::new(0.0, 10.0, 1.0, 5.0).unwrap();
        let (count, listener) = counter();
        slider.on_change(listener);

        assert!(!slider.commit());
        slider.input(7.0);
        assert!(slider.commit());
        assert!(!slider.commit());

        slider.input(8.0);
        slider.input(7.0);
        assert!(!slider.commit());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let slider = Slider::new(0.0, 1.0, 0.5, 0.0).unwrap();
        let (count, listener) = counter();
        let id = slider.on_input(listener);

        slider.input(0.5);
        assert!(slider.unsubscribe(id));
        assert!(!slider.unsubscribe(id));
        slider.input(1.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(slider.listener_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let slider = Slider::new(0.0, 4.0, 1.0, 0.0).unwrap();
        let other = slider.clone();
        other.set(3.0);
        assert_eq!(slider.value(), 3.0);
    }

    #[test]
    fn listeners_may_read_the_slider() {
        let slider = Slider::new(0.0, 4.0, 1.0, 0.0).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (handle, log) = (slider.clone(), seen.clone());
        slider.on_input(move |v| log.lock().push((v, handle.value())));

        slider.input(2.0);
        assert_eq!(*seen.lock(), vec![(2.0, 2.0)]);
    }

    #[test]
    fn controller_maps_pointer_to_value() {
        let slider = Slider::new(0.0, 1.0, 0.1, 0.0).unwrap();
        let (changes, listener) = counter();
        slider.on_change(listener);
        let mut controller = SliderController::new(slider.clone(), 200.0).unwrap();

        assert!(!controller.drag(100.0));
        controller.press(40.0);
        controller.drag(150.0);
        controller.drag(500.0);
        assert_eq!(slider.value(), 1.0);
        assert!(controller.release());
        assert!(!controller.release());
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn controller_rejects_empty_track() {
        let slider = Slider::new(0.0, 1.0, 0.1, 0.0).unwrap();
        assert!(SliderController::new(slider, 0.0).is_err());
    }
}
