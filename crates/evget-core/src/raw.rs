//! The external-collaborator surface: raw platform events and device
//! snapshots (spec §6). The concrete X11/Wayland/Win32 producer is out of
//! core scope (spec §1); this module only defines the shapes the core
//! consumes and the traits a concrete driver must implement.

use chrono::{DateTime, Utc};

/// Platform event classes the transformer dispatches on (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventType {
    DeviceChanged,
    HierarchyChanged,
    Motion,
    ButtonPress,
    ButtonRelease,
    KeyPress,
    KeyRelease,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
}

/// One valuator's `(index, absolute_value)` pair reported on a `Motion`
/// event; only valuators that changed in this event are present (spec §6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuatorSample {
    pub index: i32,
    pub value: f64,
}

/// Active-window metadata attached to emitted entries when available (spec
/// §3's `focus_window_*` fields).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FocusWindow {
    pub name: Option<String>,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// One event emitted by the platform-specific source (spec §6's
/// `RawEvent`). `character`/`key_name` are pre-resolved by the driver: key
/// symbol translation depends on keyboard layout state that only the
/// platform driver owns (XKB, a Win32 keyboard layout handle, ...), so the
/// core never guesses at a keycode's printable representation itself.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_type: RawEventType,
    pub timestamp: DateTime<Utc>,
    pub device_id: i32,
    pub source_device_id: i32,
    pub pointer_emulated: bool,
    pub auto_repeat: bool,
    pub modifier_mask: u32,
    pub position_x: f64,
    pub position_y: f64,
    /// Button code (Button*) or key code (Key*); unused otherwise.
    pub detail: i32,
    /// Pre-resolved UTF-8 character for `KeyPress`/`KeyRelease`; empty when
    /// the key has no printable representation.
    pub character: String,
    /// Pre-resolved canonical key name for `KeyPress`/`KeyRelease`.
    pub key_name: String,
    /// Valuators that changed in this event; empty outside `Motion`.
    pub valuators: Vec<ValuatorSample>,
    pub focus_window: Option<FocusWindow>,
}

impl RawEvent {
    pub fn valuator(&self, index: i32) -> Option<f64> {
        self.valuators.iter().find(|sample| sample.index == index).map(|sample| sample.value)
    }
}

/// An abstract async event source (spec §6). `next_event` never returns
/// `None`: the source is unbounded and the loop runs until stopped
/// externally. Generic rather than a trait object, mirroring the original's
/// `EventLoop<T>` template parameter — the concrete source is chosen once,
/// at wiring time, not per-call.
pub trait RawEventSource: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn next_event(
        &mut self,
    ) -> impl std::future::Future<Output = Result<RawEvent, Self::Error>> + Send;
}

/// Logical class of input device as reported by the platform's type atom
/// (spec §4.6 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDeviceKindHint {
    Mouse,
    Keyboard,
    Touchpad,
    Touchscreen,
    Unsupported,
}

/// One scroll axis on a device, as reported by the platform (spec §4.6
/// step 4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawScrollAxis {
    pub valuator_index: i32,
    pub orientation: crate::registry::ScrollOrientation,
    /// Sign of the axis's natural increment; used to derive delta sign
    /// (spec §4.7).
    pub increment_sign: i8,
    pub current_value: f64,
}

/// One button on a device, as reported by the platform (spec §4.6 step 3).
#[derive(Debug, Clone, PartialEq)]
pub struct RawButton {
    pub code: i32,
    pub label: String,
}

/// One device entry in a platform-provided snapshot (spec §4.6, §6
/// `list_devices`).
#[derive(Debug, Clone)]
pub struct RawDevice {
    pub id: i32,
    pub name: String,
    pub kind_hint: RawDeviceKindHint,
    pub buttons: Vec<RawButton>,
    pub scroll_axes: Vec<RawScrollAxis>,
    /// Valuator index labeled `Abs X`/`Rel X`, if any.
    pub valuator_x: Option<i32>,
    /// Valuator index labeled `Abs Y`/`Rel Y`, if any.
    pub valuator_y: Option<i32>,
}

/// An abstract provider of device snapshots (spec §6 `list_devices`). Queried
/// by the transformer whenever a `DeviceChanged`/`HierarchyChanged`
/// notification arrives; kept as its own trait rather than folded into
/// [`RawEventSource`] since the two are refreshed on different cadences (one
/// per raw event, the other only on hotplug).
pub trait DeviceSnapshotSource: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn snapshot(
        &mut self,
    ) -> impl std::future::Future<Output = Result<DeviceSnapshot, Self::Error>> + Send;
}

/// A full device enumeration, as returned by the platform's `list_devices`
/// (spec §6). Passed by value to [`crate::registry::DeviceRegistry::refresh_all`]
/// rather than the source trait itself, since a snapshot is a point-in-time
/// value, not an ongoing stream.
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    pub devices: Vec<RawDevice>,
}
