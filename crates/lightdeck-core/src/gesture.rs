//! Touch gesture recognition.
//!
//! Recognition runs in two stages. [`PointerTracker`] turns the raw
//! per-tick touch sample into pointer events (press, move, hold, release).
//! [`GestureInterpreter`] then maps those events onto the on-screen
//! controls, telling taps, long presses and slider drags apart.
//!
//! ```text
//! sample: None  Some(a) Some(a) Some(b) None
//! event:   -    Press   Hold    Move    Release(b)
//! ```
//!
//! The interpreter keeps no state of its own; the partially recognized
//! gesture lives in a [`TouchState`] owned by the caller.

use std::time::{Duration, Instant};

use tracing::debug;

use lightdeck_types::Brightness;

use crate::layout::{Layout, Point, Region};
use crate::store::DeviceStore;

/// Phase of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// The finger went down.
    Press,
    /// The finger is down and moved since the last tick.
    Move,
    /// The finger is down and did not move.
    Hold,
    /// The finger was lifted. Carries the last touched position.
    Release,
}

/// One pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened.
    pub phase: TouchPhase,
    /// Where it happened.
    pub point: Point,
    /// When it was sampled.
    pub at: Instant,
}

/// Converts per-tick touch samples into [`PointerEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last: Option<Point>,
}

impl PointerTracker {
    /// Create a tracker with no active touch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a touch is in progress.
    pub fn is_touching(&self) -> bool {
        self.last.is_some()
    }

    /// Feed the touch position for this tick (`None` if untouched).
    pub fn sample(&mut self, touch: Option<Point>, now: Instant) -> Option<PointerEvent> {
        let event = match (self.last, touch) {
            (None, None) => None,
            (None, Some(point)) => Some((TouchPhase::Press, point)),
            (Some(prev), Some(point)) if prev == point => Some((TouchPhase::Hold, point)),
            (Some(_), Some(point)) => Some((TouchPhase::Move, point)),
            (Some(prev), None) => Some((TouchPhase::Release, prev)),
        };
        self.last = touch;

        event.map(|(phase, point)| PointerEvent {
            phase,
            point,
            at: now,
        })
    }
}

/// A slider touch in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderTouch {
    /// Light index.
    pub index: usize,
    /// Horizontal position where the touch started.
    pub start_x: i32,
    /// Whether the drag threshold has been crossed.
    pub dragged: bool,
}

/// A power button press waiting to become a long press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedPress {
    /// Light index.
    pub index: usize,
    /// When the button was pressed.
    pub pressed_at: Instant,
}

/// Partially recognized gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchState {
    /// Latched slider, if the touch started on one.
    pub slider: Option<SliderTouch>,
    /// Armed power button, if the touch started on one.
    pub press: Option<ArmedPress>,
}

impl TouchState {
    /// Drop any partial gesture.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// A slider is touched but has not moved far enough to count as a drag.
    SliderHold(usize),
    /// A slider is being dragged to `brightness`.
    SliderDrag {
        /// Light index.
        index: usize,
        /// Brightness under the finger.
        brightness: Brightness,
    },
    /// A latched slider was released.
    SliderRelease {
        /// Light index.
        index: usize,
        /// Whether the touch ever crossed the drag threshold.
        dragged: bool,
    },
    /// A power button was held for the long-press duration.
    LongPress(usize),
    /// An armed power button was released without a long press.
    ButtonRelease(usize),
}

/// Maps pointer events onto controls.
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    layout: Layout,
    drag_threshold: i32,
    long_press: Duration,
}

impl GestureInterpreter {
    /// Create an interpreter.
    ///
    /// # Arguments
    ///
    /// * `layout` - Control geometry
    /// * `drag_threshold` - Minimum horizontal travel (px) for a slider drag
    /// * `long_press` - Hold time required to toggle a power button
    pub fn new(layout: Layout, drag_threshold: i32, long_press: Duration) -> Self {
        Self {
            layout,
            drag_threshold,
            long_press,
        }
    }

    /// The control geometry.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Advance `state` by one pointer event.
    pub fn interpret(
        &self,
        state: &mut TouchState,
        store: &DeviceStore,
        event: PointerEvent,
    ) -> Option<Gesture> {
        match event.phase {
            TouchPhase::Press => self.on_press(state, store, event),
            TouchPhase::Move | TouchPhase::Hold => self.on_contact(state, event),
            TouchPhase::Release => Self::on_release(state),
        }
    }

    fn on_press(
        &self,
        state: &mut TouchState,
        store: &DeviceStore,
        event: PointerEvent,
    ) -> Option<Gesture> {
        state.clear();

        match self.layout.hit_test(event.point)? {
            Region::PowerButton(index) if store.is_enabled(index) => {
                debug!(index, "Power button armed");
                state.press = Some(ArmedPress {
                    index,
                    pressed_at: event.at,
                });
                None
            }
            Region::BrightnessSlider(index)
                if store.get(index).is_some_and(|l| l.is_enabled() && l.is_on) =>
            {
                debug!(index, start_x = event.point.x, "Slider latched");
                state.slider = Some(SliderTouch {
                    index,
                    start_x: event.point.x,
                    dragged: false,
                });
                Some(Gesture::SliderHold(index))
            }
            _ => None,
        }
    }

    fn on_contact(&self, state: &mut TouchState, event: PointerEvent) -> Option<Gesture> {
        if let Some(slider) = state.slider.as_mut() {
            if !slider.dragged && (event.point.x - slider.start_x).abs() >= self.drag_threshold {
                debug!(index = slider.index, x = event.point.x, "Slider drag started");
                slider.dragged = true;
            }
            if !slider.dragged {
                return Some(Gesture::SliderHold(slider.index));
            }
            let brightness = self.layout.slider_value(slider.index, event.point.x);
            return Some(Gesture::SliderDrag {
                index: slider.index,
                brightness: Brightness::new(brightness),
            });
        }

        let press = state.press?;
        let on_button = self.layout.hit_test(event.point) == Some(Region::PowerButton(press.index));
        if on_button && event.at.saturating_duration_since(press.pressed_at) >= self.long_press {
            debug!(index = press.index, "Long press");
            state.press = None;
            return Some(Gesture::LongPress(press.index));
        }
        None
    }

    fn on_release(state: &mut TouchState) -> Option<Gesture> {
        if let Some(slider) = state.slider.take() {
            return Some(Gesture::SliderRelease {
                index: slider.index,
                dragged: slider.dragged,
            });
        }
        state
            .press
            .take()
            .map(|press| Gesture::ButtonRelease(press.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightdeck_types::{Light, Sensor};

    const THRESHOLD: i32 = 20;
    const LONG_PRESS: Duration = Duration::from_millis(500);

    fn store() -> DeviceStore {
        let mut lights = vec![
            Light::new("AAA", "One"),
            Light::new("BBB", "Two"),
            Light::new("", "Three"),
            Light::new("DDD", "Four"),
        ];
        lights[0].is_on = true;
        lights[2].is_on = true;
        DeviceStore::new(lights, Sensor::new("", ""))
    }

    fn interpreter() -> GestureInterpreter {
        GestureInterpreter::new(Layout::new(4), THRESHOLD, LONG_PRESS)
    }

    fn event(phase: TouchPhase, x: i32, y: i32, at: Instant) -> PointerEvent {
        PointerEvent {
            phase,
            point: Point::new(x, y),
            at,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_tracker_phases() {
        let t0 = Instant::now();
        let mut tracker = PointerTracker::new();
        let a = Point::new(10, 10);
        let b = Point::new(30, 10);

        assert_eq!(tracker.sample(None, t0), None);
        assert_eq!(tracker.sample(Some(a), t0).unwrap().phase, TouchPhase::Press);
        assert!(tracker.is_touching());
        assert_eq!(tracker.sample(Some(a), t0).unwrap().phase, TouchPhase::Hold);
        assert_eq!(tracker.sample(Some(b), t0).unwrap().phase, TouchPhase::Move);

        let release = tracker.sample(None, t0 + ms(10)).unwrap();
        assert_eq!(release.phase, TouchPhase::Release);
        assert_eq!(release.point, b);
        assert_eq!(release.at, t0 + ms(10));
        assert!(!tracker.is_touching());
        assert_eq!(tracker.sample(None, t0), None);
    }

    #[test]
    fn test_slider_hold_below_threshold() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let track = interp.layout().slider_track(0);
        let y = track.y + 10;

        let g = interp.interpret(&mut state, &store, event(TouchPhase::Press, 100, y, t0));
        assert_eq!(g, Some(Gesture::SliderHold(0)));

        let g = interp.interpret(&mut state, &store, event(TouchPhase::Move, 119, y, t0));
        assert_eq!(g, Some(Gesture::SliderHold(0)));

        let g = interp.interpret(&mut state, &store, event(TouchPhase::Release, 119, y, t0));
        assert_eq!(
            g,
            Some(Gesture::SliderRelease {
                index: 0,
                dragged: false
            })
        );
        assert_eq!(state, TouchState::default());
    }

    #[test]
    fn test_slider_drag_latches() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let track = interp.layout().slider_track(0);
        let y = track.y + 10;

        interp.interpret(&mut state, &store, event(TouchPhase::Press, 100, y, t0));
        let g = interp.interpret(&mut state, &store, event(TouchPhase::Move, 120, y, t0));
        let expected = interp.layout().slider_value(0, 120);
        assert_eq!(
            g,
            Some(Gesture::SliderDrag {
                index: 0,
                brightness: Brightness::new(expected)
            })
        );

        // Moving back within the threshold keeps dragging.
        let g = interp.interpret(&mut state, &store, event(TouchPhase::Move, 105, y, t0));
        assert!(matches!(g, Some(Gesture::SliderDrag { index: 0, .. })));

        let g = interp.interpret(&mut state, &store, event(TouchPhase::Release, 105, y, t0));
        assert_eq!(
            g,
            Some(Gesture::SliderRelease {
                index: 0,
                dragged: true
            })
        );
    }

    #[test]
    fn test_slider_ignored_when_light_off_or_disabled() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let y = interp.layout().slider_track(0).y + 10;

        // Light 1 is off.
        let x = interp.layout().slider_track(1).x + 10;
        let mut state = TouchState::default();
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0)),
            None
        );
        assert_eq!(state, TouchState::default());

        // Light 2 is on but has no ID.
        let x = interp.layout().slider_track(2).x + 10;
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0)),
            None
        );
        assert_eq!(state, TouchState::default());
    }

    #[test]
    fn test_long_press_fires_once() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let button = interp.layout().power_button(1);
        let (x, y) = (button.x + 10, button.y + 10);

        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0)),
            None
        );
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Hold, x, y, t0 + ms(499))),
            None
        );
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Hold, x, y, t0 + ms(500))),
            Some(Gesture::LongPress(1))
        );
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Hold, x, y, t0 + ms(900))),
            None
        );
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Release, x, y, t0 + ms(950))),
            None
        );
    }

    #[test]
    fn test_short_press_is_button_release() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let button = interp.layout().power_button(0);
        let (x, y) = (button.x + 10, button.y + 10);

        interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0));
        interp.interpret(&mut state, &store, event(TouchPhase::Hold, x, y, t0 + ms(200)));
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Release, x, y, t0 + ms(300))),
            Some(Gesture::ButtonRelease(0))
        );
    }

    #[test]
    fn test_leaving_button_suspends_long_press() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let button = interp.layout().power_button(0);
        let (x, y) = (button.x + 10, button.y + 10);

        interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0));
        // Outside any control after the duration elapsed: nothing fires.
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Move, x, 40, t0 + ms(600))),
            None
        );
        assert!(state.press.is_some());
        // Back on the button: fires.
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Move, x, y, t0 + ms(700))),
            Some(Gesture::LongPress(0))
        );
    }

    #[test]
    fn test_disabled_button_is_inert() {
        let t0 = Instant::now();
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        let button = interp.layout().power_button(2);
        let (x, y) = (button.x + 10, button.y + 10);

        interp.interpret(&mut state, &store, event(TouchPhase::Press, x, y, t0));
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Hold, x, y, t0 + ms(800))),
            None
        );
        assert_eq!(
            interp.interpret(&mut state, &store, event(TouchPhase::Release, x, y, t0 + ms(900))),
            None
        );
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let interp = interpreter();
        let store = store();
        let mut state = TouchState::default();
        assert_eq!(
            interp.interpret(
                &mut state,
                &store,
                event(TouchPhase::Release, 0, 0, Instant::now())
            ),
            None
        );
    }
}
