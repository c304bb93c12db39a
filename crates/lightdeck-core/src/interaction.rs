//! The touch panel state machine.
//!
//! [`Controller`] ties the pieces together: it feeds pointer samples through
//! the gesture interpreter, applies gestures to the [`DeviceStore`]
//! optimistically, pushes commands through the [`DispatchGate`], and keeps
//! the screen and the local state in sync with the service.
//!
//! # Tick
//!
//! The controller has no clock or task of its own. The caller invokes
//! [`Controller::tick`] periodically (the terminal panel does so every
//! 10 ms) with the current time and touch position. One tick runs, in
//! order:
//!
//! 1. Pointer sampling. Any contact counts as activity.
//! 2. Screen power. A dimmed screen swallows all touch input; only a press
//!    wakes it. Input is also ignored for a short window after waking.
//! 3. Gesture handling (drag, long press).
//! 4. Delayed power-off.
//! 5. At most one command dispatch.
//! 6. Reconciliation after a quiet period following the last dispatch.
//! 7. Periodic sensor refresh.
//!
//! Steps 4 to 7 run whether or not the screen is dimmed.
//!
//! # Delayed power-off
//!
//! Switching a light off only changes the screen at first. The `turnOff`
//! command is sent once the delay has passed and only if the light is still
//! off, so an accidental toggle can be undone without the lamp flickering.
//! Each light has its own delay slot.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use lightdeck_types::{CommandKind, LightCommand};

use crate::dispatch::DispatchGate;
use crate::display::Display;
use crate::gesture::{Gesture, GestureInterpreter, PointerEvent, PointerTracker, TouchPhase, TouchState};
use crate::layout::{Layout, Point};
use crate::store::DeviceStore;
use crate::timing::{BACKLIGHT_AWAKE, BACKLIGHT_DIMMED, Timings};
use crate::traits::DeviceApi;

/// Backlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenPower {
    /// Full brightness, touch input is handled.
    #[default]
    Awake,
    /// Backlight off; the next press only wakes the screen.
    Dimmed,
}

/// Timers and flags of the state machine.
///
/// Holds indices and timestamps only; device state lives in the store.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    tracker: PointerTracker,
    touch: TouchState,
    screen: ScreenPower,
    last_activity: Option<Instant>,
    woke_at: Option<Instant>,
    pending_off: Vec<Option<Instant>>,
    gate: DispatchGate,
    dirty: bool,
    last_sensor_refresh: Option<Instant>,
}

impl InteractionContext {
    /// Create a context for `light_count` lights.
    pub fn new(light_count: usize, timings: &Timings) -> Self {
        Self {
            tracker: PointerTracker::new(),
            touch: TouchState::default(),
            screen: ScreenPower::Awake,
            last_activity: None,
            woke_at: None,
            pending_off: vec![None; light_count],
            gate: DispatchGate::new(timings.debounce()),
            dirty: false,
            last_sensor_refresh: None,
        }
    }

    /// Current backlight state.
    pub fn screen(&self) -> ScreenPower {
        self.screen
    }

    /// Whether a reconciliation refresh is due after the quiet period.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// When the delayed power-off of light `index` was armed.
    pub fn pending_off(&self, index: usize) -> Option<Instant> {
        self.pending_off.get(index).copied().flatten()
    }

    /// The partially recognized gesture.
    pub fn touch(&self) -> &TouchState {
        &self.touch
    }

    /// The command gate.
    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    /// Time of the last touch activity.
    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }
}

/// Drives one touch panel.
pub struct Controller<A, D> {
    api: A,
    display: D,
    store: DeviceStore,
    interpreter: GestureInterpreter,
    timings: Timings,
    ctx: InteractionContext,
}

impl<A: DeviceApi, D: Display> Controller<A, D> {
    /// Create a controller. Call [`start`](Self::start) before the first tick.
    pub fn new(api: A, display: D, store: DeviceStore, timings: Timings) -> Self {
        let layout = Layout::new(store.len());
        let interpreter =
            GestureInterpreter::new(layout, timings.drag_threshold(), timings.long_press());
        let ctx = InteractionContext::new(store.len(), &timings);
        Self {
            api,
            display,
            store,
            interpreter,
            timings,
            ctx,
        }
    }

    /// Draw the screen and load the initial state of every device.
    pub async fn start(&mut self, now: Instant) {
        info!(
            lights = self.store.len(),
            enabled = self.store.enabled_indices().count(),
            sensor = self.store.sensor().is_enabled(),
            "Starting touch panel"
        );
        self.ctx.last_activity = Some(now);
        self.display.set_backlight(BACKLIGHT_AWAKE);
        self.display.draw_all(&self.store);
        self.refresh_all(now).await;
    }

    /// Run one UI tick with the current touch position.
    pub async fn tick(&mut self, now: Instant, touch: Option<Point>) {
        let event = self.ctx.tracker.sample(touch, now);
        if event.is_some() || self.ctx.last_activity.is_none() {
            self.ctx.last_activity = Some(now);
        }

        self.handle_input(now, event).await;
        self.expire_pending_off(now);
        self.dispatch_next(now).await;
        self.reconcile(now).await;
        self.poll_sensor(now).await;
    }

    /// Re-read every enabled light and the sensor.
    ///
    /// Failures are logged and leave the previous state in place. Lights
    /// with an armed delayed power-off keep their local state.
    pub async fn refresh_all(&mut self, now: Instant) {
        info!("Refreshing device status");
        let indices: Vec<usize> = self.store.enabled_indices().collect();
        for index in indices {
            if self.ctx.pending_off(index).is_some() {
                debug!(index, "Skipping refresh, power-off pending");
                continue;
            }
            let Some(id) = self.store.get(index).map(|l| l.id.clone()) else {
                continue;
            };
            match self.api.read_light_status(&id).await {
                Ok(status) => {
                    debug!(index, on = status.is_on, brightness = %status.brightness, "Light status");
                    self.store.apply_status(index, status);
                    self.display.draw_panel(&self.store, index);
                }
                Err(e) => warn!(index, device_id = %id, error = %e, "Failed to read light status"),
            }
        }
        self.refresh_sensor(now).await;
        self.ctx.dirty = false;
    }

    // --- Accessors ---

    /// The device records.
    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// The service client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The screen.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutable access to the screen (for resizing or forced redraws).
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Timers and flags.
    pub fn context(&self) -> &InteractionContext {
        &self.ctx
    }

    /// Control geometry.
    pub fn layout(&self) -> &Layout {
        self.interpreter.layout()
    }

    /// Active timings.
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Current backlight state.
    pub fn screen(&self) -> ScreenPower {
        self.ctx.screen
    }

    /// Redraw everything with the current state.
    pub fn redraw(&mut self) {
        self.display.draw_all(&self.store);
    }

    // --- Tick stages ---

    async fn handle_input(&mut self, now: Instant, event: Option<PointerEvent>) {
        if self.ctx.screen == ScreenPower::Dimmed {
            if event.is_some_and(|e| e.phase == TouchPhase::Press) {
                self.wake(now).await;
            }
            return;
        }

        let idle = self
            .ctx
            .last_activity
            .is_some_and(|t| now.saturating_duration_since(t) >= self.timings.idle_timeout());
        if idle {
            self.dim();
            return;
        }

        if let Some(woke_at) = self.ctx.woke_at {
            if now.saturating_duration_since(woke_at) < self.timings.wake_ignore() {
                return;
            }
            self.ctx.woke_at = None;
        }

        let Some(event) = event else {
            return;
        };
        if let Some(gesture) = self
            .interpreter
            .interpret(&mut self.ctx.touch, &self.store, event)
        {
            self.apply_gesture(gesture, now);
        }
    }

    fn apply_gesture(&mut self, gesture: Gesture, now: Instant) {
        match gesture {
            Gesture::SliderHold(_) | Gesture::ButtonRelease(_) => {}
            Gesture::SliderDrag { index, brightness } => {
                let changed = self
                    .store
                    .get(index)
                    .is_some_and(|l| l.brightness != brightness);
                if changed {
                    debug!(index, %brightness, "Dragging");
                    self.store.set_brightness(index, brightness.get().into());
                    self.display.draw_panel(&self.store, index);
                }
            }
            Gesture::SliderRelease { index, dragged } => {
                if !dragged {
                    debug!(index, "Slider released without drag");
                    return;
                }
                if let Some(light) = self.store.get(index) {
                    info!(index, brightness = %light.brightness, "Brightness set");
                    self.ctx
                        .gate
                        .submit(index, LightCommand::Brightness(light.brightness));
                }
            }
            Gesture::LongPress(index) => {
                let Some(was_on) = self.store.get(index).map(|l| l.is_on) else {
                    return;
                };
                self.store.set_power(index, !was_on);
                self.display.draw_panel(&self.store, index);

                if was_on {
                    info!(index, "Switched off, power-off delayed");
                    // A still-queued turnOn must not reach the lamp.
                    self.ctx.gate.cancel(index, CommandKind::Power);
                    if let Some(slot) = self.ctx.pending_off.get_mut(index) {
                        *slot = Some(now);
                    }
                } else {
                    info!(index, "Switched on");
                    if let Some(slot) = self.ctx.pending_off.get_mut(index) {
                        *slot = None;
                    }
                    self.ctx.gate.submit(index, LightCommand::Power(true));
                }
            }
        }
    }

    fn expire_pending_off(&mut self, now: Instant) {
        let delay = self.timings.delayed_off();
        for index in 0..self.ctx.pending_off.len() {
            let Some(armed_at) = self.ctx.pending_off[index] else {
                continue;
            };
            if now.saturating_duration_since(armed_at) < delay {
                continue;
            }
            self.ctx.pending_off[index] = None;

            if self.store.get(index).is_some_and(|l| !l.is_on) {
                debug!(index, "Delayed power-off due");
                self.ctx.gate.submit(index, LightCommand::Power(false));
            } else {
                debug!(index, "Delayed power-off dropped, light is on");
            }
        }
    }

    async fn dispatch_next(&mut self, now: Instant) {
        while let Some(pending) = self.ctx.gate.poll(now) {
            let Some(id) = self
                .store
                .get(pending.index)
                .filter(|l| l.is_enabled())
                .map(|l| l.id.clone())
            else {
                debug!(index = pending.index, command = %pending.command, "Dropping command for disabled light");
                continue;
            };

            match self.api.send(&id, &pending.command).await {
                Ok(()) => info!(index = pending.index, device_id = %id, command = %pending.command, "Command sent"),
                Err(e) if e.is_dispatch_failure() => warn!(index = pending.index, device_id = %id, command = %pending.command, error = %e, "Command failed"),
                Err(e) => error!(index = pending.index, device_id = %id, command = %pending.command, error = %e, "Command rejected locally"),
            }
            self.ctx.gate.mark_sent(now);
            self.ctx.dirty = true;
            return;
        }
    }

    async fn reconcile(&mut self, now: Instant) {
        if !self.ctx.dirty || !self.ctx.gate.is_empty() || self.ctx.tracker.is_touching() {
            return;
        }
        let quiet = self
            .ctx
            .gate
            .last_dispatch()
            .is_none_or(|t| now.saturating_duration_since(t) >= self.timings.reconcile_quiet());
        if quiet {
            self.refresh_all(now).await;
        }
    }

    async fn poll_sensor(&mut self, now: Instant) {
        let due = self
            .ctx
            .last_sensor_refresh
            .is_none_or(|t| now.saturating_duration_since(t) >= self.timings.sensor_refresh());
        if due {
            self.refresh_sensor(now).await;
        }
    }

    async fn refresh_sensor(&mut self, now: Instant) {
        self.ctx.last_sensor_refresh = Some(now);
        if !self.store.sensor().is_enabled() {
            return;
        }
        let id = self.store.sensor().id.clone();
        match self.api.read_sensor_status(&id).await {
            Ok(reading) => {
                debug!(%reading, "Sensor reading");
                self.store.apply_sensor_reading(reading);
                self.display.draw_header(&self.store);
            }
            Err(e) => warn!(device_id = %id, error = %e, "Failed to read sensor"),
        }
    }

    async fn wake(&mut self, now: Instant) {
        info!("Waking screen");
        self.ctx.screen = ScreenPower::Awake;
        self.ctx.woke_at = Some(now);
        self.ctx.touch.clear();
        self.display.set_backlight(BACKLIGHT_AWAKE);
        self.refresh_all(now).await;
    }

    fn dim(&mut self) {
        info!("Dimming screen after inactivity");
        self.ctx.screen = ScreenPower::Dimmed;
        self.ctx.touch.clear();
        self.display.set_backlight(BACKLIGHT_DIMMED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lightdeck_types::{Light, Sensor};

    use crate::mock::{DisplayOp, MockDeviceApi, RecordingDisplay};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> Controller<MockDeviceApi, RecordingDisplay> {
        let api = MockDeviceApi::new()
            .with_light("AAA", true, 50)
            .with_sensor("SSS", 21.0, 40);
        let store = DeviceStore::new(
            vec![Light::new("AAA", "One"), Light::new("", "Two")],
            Sensor::new("SSS", "Meter"),
        );
        Controller::new(api, RecordingDisplay::new(), store, Timings::default())
    }

    #[tokio::test]
    async fn test_start_draws_and_refreshes() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;

        let light = c.store().get(0).unwrap();
        assert!(light.is_on);
        assert_eq!(light.brightness.get(), 50);
        assert!(c.store().sensor().is_valid());
        // One light read plus one sensor read; the disabled light is skipped.
        assert_eq!(c.api().status_reads(), 2);
        assert_eq!(c.display().backlight(), Some(BACKLIGHT_AWAKE));
        assert_eq!(c.display().ops()[1], DisplayOp::Header);
        assert!(!c.context().is_dirty());
    }

    #[tokio::test]
    async fn test_idle_ticks_do_nothing() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;
        let reads = c.api().status_reads();

        for i in 1..100 {
            c.tick(t0 + ms(i * 10), None).await;
        }
        assert_eq!(c.api().status_reads(), reads);
        assert_eq!(c.api().command_count().await, 0);
        assert_eq!(c.screen(), ScreenPower::Awake);
    }

    #[tokio::test]
    async fn test_dims_after_idle_timeout() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;

        c.tick(t0 + ms(29_999), None).await;
        assert_eq!(c.screen(), ScreenPower::Awake);
        c.tick(t0 + ms(30_000), None).await;
        assert_eq!(c.screen(), ScreenPower::Dimmed);
        assert_eq!(c.display().backlight(), Some(BACKLIGHT_DIMMED));
    }

    #[tokio::test]
    async fn test_contact_keeps_screen_awake() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;

        // A finger resting on an empty area for longer than the idle timeout.
        let spot = Some(Point::new(640, 40));
        let mut now = t0;
        for _ in 0..40 {
            now += ms(1000);
            c.tick(now, spot).await;
        }
        assert_eq!(c.screen(), ScreenPower::Awake);
    }

    #[tokio::test]
    async fn test_sensor_polled_every_interval() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;
        let reads = c.api().status_reads();

        c.tick(t0 + ms(59_999), None).await;
        assert_eq!(c.api().status_reads(), reads);
        c.api().set_sensor("SSS", 25.0, 60).await;
        c.tick(t0 + ms(60_000), None).await;
        assert_eq!(c.api().status_reads(), reads + 1);
        assert_eq!(c.store().sensor().reading.unwrap().humidity, 60);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_state() {
        let t0 = Instant::now();
        let mut c = controller();
        c.start(t0).await;

        c.api().set_should_fail(true, None).await;
        c.refresh_all(t0).await;
        let light = c.store().get(0).unwrap();
        assert!(light.is_on);
        assert_eq!(light.brightness.get(), 50);
        assert!(c.store().sensor().is_valid());
    }
}
