//! `DeviceRegistry` (spec §4.6): the transformer's exclusive, single-owner
//! mapping from `device_id` to everything the transformer needs to classify
//! and enrich events from that device.
//!
//! Grounded on `examples/original_source/evgetx11/src/XDeviceRefresh.cpp`'s
//! `devices`/`idToName` maps, generalized per spec.md §3's "Supplemented
//! features" item 2: a pure `classify_device_kind` helper instead of the
//! inline atom matching the original sketches.

use std::collections::HashMap;

use crate::error::{device_registry_error, Error, Result};
use crate::event::DeviceKind;
use crate::raw::{DeviceSnapshot, RawDeviceKindHint};

/// Orientation of a scroll axis (spec §3 `DeviceRegistry entry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrientation {
    Vertical,
    Horizontal,
}

/// Per-device scroll axis state, including the running absolute value used
/// to compute deltas (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAxisState {
    pub orientation: ScrollOrientation,
    pub increment_sign: i8,
    pub last_absolute_value: f64,
}

/// One device's registry entry (spec §3 `DeviceRegistry entry`).
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub id: i32,
    pub kind: DeviceKind,
    pub name: String,
    pub buttons: HashMap<i32, String>,
    /// Keyed by valuator index, since that's what a `Motion` event's
    /// changed-valuator set reports.
    pub scroll_axes: HashMap<i32, ScrollAxisState>,
    pub valuator_x: Option<i32>,
    pub valuator_y: Option<i32>,
}

/// Classify a platform type-atom hint into a [`DeviceKind`], or `None` for
/// an unsupported device class (spec §4.6 step 1). Split out as its own
/// pure function per spec.md §3's supplemented-features list, so it's
/// independently testable without a full snapshot.
pub fn classify_device_kind(hint: RawDeviceKindHint) -> Option<DeviceKind> {
    match hint {
        RawDeviceKindHint::Mouse => Some(DeviceKind::Mouse),
        RawDeviceKindHint::Keyboard => Some(DeviceKind::Keyboard),
        RawDeviceKindHint::Touchpad => Some(DeviceKind::Touchpad),
        RawDeviceKindHint::Touchscreen => Some(DeviceKind::Touchscreen),
        RawDeviceKindHint::Unsupported => None,
    }
}

/// Maintains `device_id -> (kind, name, button map, scroll axes, x/y
/// valuators)`. Owned exclusively by [`crate::transformer::EventTransformer`];
/// no internal locking, since it's only ever touched from the single
/// EventLoop-driven task (spec §5).
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<i32, DeviceEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the entire mapping from a platform-provided snapshot (spec
    /// §4.6 `refresh_all`). Idempotent in the resulting mapping shape, but
    /// each re-refresh resets every `last_absolute_value` to the snapshot's
    /// current reading — scroll deltas after a hotplug are zero-based by
    /// design (spec §4.6 "Tie-breaks").
    pub fn refresh_all(&mut self, snapshot: &DeviceSnapshot) -> Result<()> {
        let mut rebuilt = HashMap::with_capacity(snapshot.devices.len());
        for device in &snapshot.devices {
            let Some(kind) = classify_device_kind(device.kind_hint) else {
                continue;
            };

            let mut buttons = HashMap::with_capacity(device.buttons.len());
            for button in &device.buttons {
                buttons.insert(button.code, button.label.clone());
            }

            let mut scroll_axes = HashMap::with_capacity(device.scroll_axes.len());
            for axis in &device.scroll_axes {
                scroll_axes.insert(
                    axis.valuator_index,
                    ScrollAxisState {
                        orientation: axis.orientation,
                        increment_sign: axis.increment_sign,
                        last_absolute_value: axis.current_value,
                    },
                );
            }

            if rebuilt.contains_key(&device.id) {
                return Err(device_registry_error(format!(
                    "device id {} enumerated more than once in snapshot",
                    device.id
                )));
            }

            rebuilt.insert(
                device.id,
                DeviceEntry {
                    id: device.id,
                    kind,
                    name: device.name.clone(),
                    buttons,
                    scroll_axes,
                    // First encountered axis labeled X/Y wins (spec §4.6 tie-break);
                    // the snapshot already resolved that at the driver, so we just
                    // carry the winner through.
                    valuator_x: device.valuator_x,
                    valuator_y: device.valuator_y,
                },
            );
        }

        self.devices = rebuilt;
        Ok(())
    }

    pub fn contains(&self, id: i32) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn device(&self, id: i32) -> Result<&DeviceEntry> {
        self.devices.get(&id).ok_or_else(|| unknown_device_error(id))
    }

    pub fn device_mut(&mut self, id: i32) -> Result<&mut DeviceEntry> {
        self.devices.get_mut(&id).ok_or_else(|| unknown_device_error(id))
    }

    pub fn name_of(&self, id: i32) -> Result<&str> {
        self.device(id).map(|device| device.name.as_str())
    }

    pub fn button_name(&self, id: i32, code: i32) -> Result<Option<&str>> {
        self.device(id).map(|device| device.buttons.get(&code).map(String::as_str))
    }

    /// Record a scroll axis's new absolute value and return the signed
    /// delta (spec §4.7 motion branch). Returns `0.0` the first time an
    /// axis is observed within a registry lifetime, since `last ==
    /// new_value` by construction at refresh time (spec §8 boundary case).
    pub fn record_scroll_delta(&mut self, id: i32, valuator_index: i32, new_value: f64) -> Result<f64> {
        let device = self.device_mut(id)?;
        let axis = device.scroll_axes.get_mut(&valuator_index).ok_or_else(|| {
            Error::Transform(format!(
                "device {id} has no scroll axis registered for valuator {valuator_index}"
            ))
        })?;
        let delta = new_value - axis.last_absolute_value;
        axis.last_absolute_value = new_value;
        Ok(delta)
    }
}

fn unknown_device_error(id: i32) -> Error {
    device_registry_error(format!("device id {id} not present in registry; caller must check contains()"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawButton, RawDevice, RawScrollAxis};

    fn snapshot_with_mouse() -> DeviceSnapshot {
        DeviceSnapshot {
            devices: vec![RawDevice {
                id: 3,
                name: "m".into(),
                kind_hint: RawDeviceKindHint::Mouse,
                buttons: vec![RawButton { code: 1, label: "Left".into() }],
                scroll_axes: vec![RawScrollAxis {
                    valuator_index: 2,
                    orientation: ScrollOrientation::Vertical,
                    increment_sign: 1,
                    current_value: 100.0,
                }],
                valuator_x: Some(0),
                valuator_y: Some(1),
            }],
        }
    }

    #[test]
    fn refresh_all_skips_unsupported_devices() {
        let mut registry = DeviceRegistry::new();
        let snapshot = DeviceSnapshot {
            devices: vec![RawDevice {
                id: 9,
                name: "weird".into(),
                kind_hint: RawDeviceKindHint::Unsupported,
                buttons: vec![],
                scroll_axes: vec![],
                valuator_x: None,
                valuator_y: None,
            }],
        };
        registry.refresh_all(&snapshot).unwrap();
        assert!(!registry.contains(9));
    }

    #[test]
    fn refresh_all_records_button_names_and_scroll_state() {
        let mut registry = DeviceRegistry::new();
        registry.refresh_all(&snapshot_with_mouse()).unwrap();
        assert_eq!(registry.button_name(3, 1).unwrap(), Some("Left"));
        assert_eq!(registry.name_of(3).unwrap(), "m");
    }

    #[test]
    fn record_scroll_delta_is_zero_on_first_observation_after_refresh() {
        let mut registry = DeviceRegistry::new();
        registry.refresh_all(&snapshot_with_mouse()).unwrap();
        let delta = registry.record_scroll_delta(3, 2, 100.0).unwrap();
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn record_scroll_delta_updates_last_value() {
        let mut registry = DeviceRegistry::new();
        registry.refresh_all(&snapshot_with_mouse()).unwrap();
        let delta = registry.record_scroll_delta(3, 2, 105.0).unwrap();
        assert_eq!(delta, 5.0);
        let delta_again = registry.record_scroll_delta(3, 2, 105.0).unwrap();
        assert_eq!(delta_again, 0.0);
    }

    #[test]
    fn re_refresh_resets_last_absolute_value() {
        let mut registry = DeviceRegistry::new();
        registry.refresh_all(&snapshot_with_mouse()).unwrap();
        registry.record_scroll_delta(3, 2, 150.0).unwrap();
        registry.refresh_all(&snapshot_with_mouse()).unwrap();
        let delta = registry.record_scroll_delta(3, 2, 100.0).unwrap();
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn querying_unknown_device_is_an_error() {
        let registry = DeviceRegistry::new();
        assert!(!registry.contains(42));
        assert!(registry.device(42).is_err());
    }
}
