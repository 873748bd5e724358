//! Synthetic, non-X11 event source and device snapshot for the
//! demonstration binary (spec.md §1: the concrete platform driver is an
//! external collaborator, out of core scope). Cycles through a small fixed
//! scene of mouse and keyboard activity so the pipeline has something to
//! push through the sinks without depending on a real display server.

use std::convert::Infallible;
use std::time::Duration;

use chrono::Utc;
use evget_core::{
    DeviceSnapshot, DeviceSnapshotSource, FocusWindow, RawButton, RawDevice, RawDeviceKindHint,
    RawEvent, RawEventSource, RawEventType, RawScrollAxis, ScrollOrientation, ValuatorSample,
};

const MOUSE_ID: i32 = 1;
const KEYBOARD_ID: i32 = 2;
const VALUATOR_X: i32 = 0;
const VALUATOR_Y: i32 = 1;
const VALUATOR_SCROLL: i32 = 2;

/// The fixed device population the synthetic source pretends to drive: one
/// mouse with a vertical scroll wheel, one keyboard with a single key.
pub struct SyntheticDeviceSnapshotSource;

impl DeviceSnapshotSource for SyntheticDeviceSnapshotSource {
    type Error = Infallible;

    async fn snapshot(&mut self) -> Result<DeviceSnapshot, Infallible> {
        Ok(DeviceSnapshot {
            devices: vec![
                RawDevice {
                    id: MOUSE_ID,
                    name: "Synthetic Mouse".to_string(),
                    kind_hint: RawDeviceKindHint::Mouse,
                    buttons: vec![
                        RawButton { code: 1, label: "Left".to_string() },
                        RawButton { code: 3, label: "Right".to_string() },
                    ],
                    scroll_axes: vec![RawScrollAxis {
                        valuator_index: VALUATOR_SCROLL,
                        orientation: ScrollOrientation::Vertical,
                        increment_sign: 1,
                        current_value: 0.0,
                    }],
                    valuator_x: Some(VALUATOR_X),
                    valuator_y: Some(VALUATOR_Y),
                },
                RawDevice {
                    id: KEYBOARD_ID,
                    name: "Synthetic Keyboard".to_string(),
                    kind_hint: RawDeviceKindHint::Keyboard,
                    buttons: vec![RawButton { code: 38, label: "A".to_string() }],
                    scroll_axes: vec![],
                    valuator_x: None,
                    valuator_y: None,
                },
            ],
        })
    }
}

/// One step of the fixed demo scene, cycled indefinitely.
enum Step {
    InitialDeviceChanged,
    MouseMove,
    MouseScroll,
    MouseButtonPress,
    MouseButtonRelease,
    KeyPress,
    KeyRelease,
}

const CYCLE: &[Step] = &[
    Step::MouseMove,
    Step::MouseScroll,
    Step::MouseButtonPress,
    Step::MouseButtonRelease,
    Step::KeyPress,
    Step::KeyRelease,
];

/// Generates a deterministic, never-ending stream of raw events across the
/// two devices described by [`SyntheticDeviceSnapshotSource`]. `next_event`
/// never returns an error (spec §6 "never returns None (source is
/// unbounded)"); the synthetic source sleeps `interval` between events so
/// shutdown latency stays bounded.
pub struct SyntheticEventSource {
    interval: Duration,
    cycle_index: usize,
    sent_initial_snapshot: bool,
    cursor_x: f64,
    cursor_y: f64,
    scroll_value: f64,
}

impl SyntheticEventSource {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cycle_index: 0,
            sent_initial_snapshot: false,
            cursor_x: 0.0,
            cursor_y: 0.0,
            scroll_value: 0.0,
        }
    }

    fn focus_window(&self) -> FocusWindow {
        FocusWindow {
            name: Some("evget-demo".to_string()),
            position_x: Some(0),
            position_y: Some(0),
            width: Some(1280),
            height: Some(720),
        }
    }

    fn base_event(&self, event_type: RawEventType, device_id: i32) -> RawEvent {
        RawEvent {
            event_type,
            timestamp: Utc::now(),
            device_id,
            source_device_id: device_id,
            pointer_emulated: false,
            auto_repeat: false,
            modifier_mask: 0,
            position_x: self.cursor_x,
            position_y: self.cursor_y,
            detail: 0,
            character: String::new(),
            key_name: String::new(),
            valuators: Vec::new(),
            focus_window: Some(self.focus_window()),
        }
    }

    fn next_step(&mut self) -> RawEvent {
        let step = &CYCLE[self.cycle_index % CYCLE.len()];
        self.cycle_index += 1;
        match step {
            Step::InitialDeviceChanged => self.base_event(RawEventType::DeviceChanged, MOUSE_ID),
            Step::MouseMove => {
                self.cursor_x += 1.0;
                self.cursor_y += 0.5;
                let mut event = self.base_event(RawEventType::Motion, MOUSE_ID);
                event.valuators =
                    vec![ValuatorSample { index: VALUATOR_X, value: self.cursor_x }, ValuatorSample {
                        index: VALUATOR_Y,
                        value: self.cursor_y,
                    }];
                event
            }
            Step::MouseScroll => {
                self.scroll_value += 1.0;
                let mut event = self.base_event(RawEventType::Motion, MOUSE_ID);
                event.valuators = vec![ValuatorSample { index: VALUATOR_SCROLL, value: self.scroll_value }];
                event
            }
            Step::MouseButtonPress => {
                let mut event = self.base_event(RawEventType::ButtonPress, MOUSE_ID);
                event.detail = 1;
                event
            }
            Step::MouseButtonRelease => {
                let mut event = self.base_event(RawEventType::ButtonRelease, MOUSE_ID);
                event.detail = 1;
                event
            }
            Step::KeyPress => {
                let mut event = self.base_event(RawEventType::KeyPress, KEYBOARD_ID);
                event.detail = 38;
                event.character = "a".to_string();
                event.key_name = "A".to_string();
                event
            }
            Step::KeyRelease => {
                let mut event = self.base_event(RawEventType::KeyRelease, KEYBOARD_ID);
                event.detail = 38;
                event.character = "a".to_string();
                event.key_name = "A".to_string();
                event
            }
        }
    }
}

impl RawEventSource for SyntheticEventSource {
    type Error = Infallible;

    async fn next_event(&mut self) -> Result<RawEvent, Infallible> {
        if !self.sent_initial_snapshot {
            self.sent_initial_snapshot = true;
            return Ok(self.base_event(RawEventType::DeviceChanged, MOUSE_ID));
        }
        tokio::time::sleep(self.interval).await;
        Ok(self.next_step())
    }
}
