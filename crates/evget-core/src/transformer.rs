//! `EventTransformer` (spec §4.7): turns one raw platform event into zero or
//! more typed [`Data`] records, using the [`DeviceRegistry`] it exclusively
//! owns.

use chrono::{DateTime, Utc};

use crate::error::{transform_error, Result};
use crate::event::entry::{KeyBuilder, MouseClickBuilder, MouseMoveBuilder, MouseScrollBuilder};
use crate::event::{ButtonAction, Data, Entry, EventBatch, ModifierValue};
use crate::event::entry::CommonBuilder;
use crate::registry::{DeviceRegistry, ScrollOrientation};
use crate::raw::{DeviceSnapshotSource, RawEvent, RawEventType};

/// Button labels that represent wheel pseudo-buttons rather than real
/// buttons (spec §3 "Supplemented features": `XEventSwitchCore.cpp`'s
/// `BTN_LABEL_PROP_BTN_WHEEL_{UP,DOWN}` / `_HWHEEL_{LEFT,RIGHT}`). Scroll
/// wheels already surface through the `Motion` valuator path as
/// `MouseScroll`; their button-press shadow events are suppressed here to
/// avoid double-counting the same physical action.
const WHEEL_PSEUDO_BUTTON_LABELS: &[&str] =
    &["wheelup", "wheeldown", "hwheelleft", "hwheelright"];

fn is_wheel_pseudo_button(label: &str) -> bool {
    let lower = label.to_ascii_lowercase();
    WHEEL_PSEUDO_BUTTON_LABELS.iter().any(|candidate| lower.contains(candidate))
}

/// Stateful classifier: the transformer is the sole owner of the
/// [`DeviceRegistry`] and the `start` instant interval is measured from
/// (spec §3 "Ownership").
pub struct EventTransformer<S: DeviceSnapshotSource> {
    registry: DeviceRegistry,
    start: Option<DateTime<Utc>>,
    snapshot_source: S,
}

impl<S: DeviceSnapshotSource> EventTransformer<S> {
    pub fn new(snapshot_source: S) -> Self {
        Self { registry: DeviceRegistry::new(), start: None, snapshot_source }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Nanoseconds since `start`, initializing `start` on first call.
    /// Monotonically non-decreasing across the stream as long as
    /// `raw.timestamp` is (spec §8 property 1).
    fn interval_since_start(&mut self, timestamp: DateTime<Utc>) -> i64 {
        let start = *self.start.get_or_insert(timestamp);
        (timestamp - start).num_nanoseconds().unwrap_or(0)
    }

    /// Shared attachment step: decode the modifier mask into one
    /// [`ModifierValue`] per set bit and attach each to `data`. Centralized
    /// here (spec.md §3 "Supplemented features" `attach_common` helper) so
    /// every transform branch gets identical modifier handling.
    fn attach_common(&self, data: &mut Data, raw: &RawEvent) {
        data.attach_modifiers(ModifierValue::decode_mask(raw.modifier_mask));
    }

    fn common_builder(&mut self, raw: &RawEvent, device_name: String) -> Result<CommonBuilder> {
        let interval = self.interval_since_start(raw.timestamp);
        let device = self.registry.device(raw.device_id)?;
        let mut builder = CommonBuilder::default();
        builder
            .interval(interval)
            .timestamp(raw.timestamp)
            .device_kind(device.kind)
            .device_name(device_name)
            .position(raw.position_x, raw.position_y);
        if let Some(focus) = &raw.focus_window {
            builder.focus_window(
                focus.name.clone(),
                focus.position_x,
                focus.position_y,
                focus.width,
                focus.height,
            );
        }
        Ok(builder)
    }

    /// Turn one raw platform event into zero or more typed [`Data`] records
    /// (spec §4.7). Malformed/unclassifiable events are never returned as
    /// an error here beyond [`crate::error::Error::Transform`] for cases
    /// the caller should be able to log and skip (spec §7 propagation
    /// policy: "refuses malformed inputs silently").
    pub async fn transform(&mut self, raw: &RawEvent) -> Result<EventBatch> {
        if matches!(raw.event_type, RawEventType::DeviceChanged | RawEventType::HierarchyChanged) {
            let snapshot = self
                .snapshot_source
                .snapshot()
                .await
                .map_err(|e| transform_error(format!("device snapshot fetch failed: {e}")))?;
            self.registry.refresh_all(&snapshot)?;
            return Ok(Vec::new());
        }

        match raw.event_type {
            RawEventType::Motion => self.transform_motion(raw),
            RawEventType::ButtonPress | RawEventType::ButtonRelease => self.transform_button(raw),
            RawEventType::KeyPress | RawEventType::KeyRelease => self.transform_key(raw),
            RawEventType::TouchBegin | RawEventType::TouchUpdate | RawEventType::TouchEnd => {
                self.transform_touch(raw)
            }
            RawEventType::DeviceChanged | RawEventType::HierarchyChanged => unreachable!(),
        }
    }

    fn transform_motion(&mut self, raw: &RawEvent) -> Result<EventBatch> {
        if !self.registry.contains(raw.device_id) || raw.pointer_emulated {
            return Ok(Vec::new());
        }

        let mut batch = Vec::new();
        let device_name = self.registry.name_of(raw.device_id)?.to_string();
        let (valuator_x, valuator_y) = {
            let device = self.registry.device(raw.device_id)?;
            (device.valuator_x, device.valuator_y)
        };

        let moved = raw.valuators.iter().any(|sample| {
            Some(sample.index) == valuator_x || Some(sample.index) == valuator_y
        });
        if moved {
            let common = self.common_builder(raw, device_name.clone())?;
            let mut data = Data::new(Entry::MouseMove(MouseMoveBuilder { common, ..Default::default() }.build()));
            self.attach_common(&mut data, raw);
            batch.push(data);
        }

        let mut vertical_delta = 0.0_f64;
        let mut horizontal_delta = 0.0_f64;
        let mut scroll_contributed = false;
        for sample in &raw.valuators {
            let axis_info = self
                .registry
                .device(raw.device_id)?
                .scroll_axes
                .get(&sample.index)
                .copied();
            let Some(axis) = axis_info else { continue };
            let raw_delta = self.registry.record_scroll_delta(raw.device_id, sample.index, sample.value)?;
            let signed_delta = raw_delta * f64::from(axis.increment_sign);
            scroll_contributed = true;
            match axis.orientation {
                ScrollOrientation::Vertical => vertical_delta += signed_delta,
                ScrollOrientation::Horizontal => horizontal_delta += signed_delta,
            }
        }

        if scroll_contributed && (vertical_delta != 0.0 || horizontal_delta != 0.0) {
            let common = self.common_builder(raw, device_name)?;
            let mut scroll_builder = MouseScrollBuilder::default();
            scroll_builder.common = common;
            scroll_builder.vertical_delta(vertical_delta).horizontal_delta(horizontal_delta);
            let mut data = Data::new(Entry::MouseScroll(scroll_builder.build()));
            self.attach_common(&mut data, raw);
            batch.push(data);
        }

        Ok(batch)
    }

    fn transform_button(&mut self, raw: &RawEvent) -> Result<EventBatch> {
        if !self.registry.contains(raw.device_id) || raw.pointer_emulated {
            return Ok(Vec::new());
        }

        let button_name = self.registry.button_name(raw.device_id, raw.detail)?.unwrap_or("").to_string();
        if is_wheel_pseudo_button(&button_name) {
            return Ok(Vec::new());
        }

        let device_name = self.registry.name_of(raw.device_id)?.to_string();
        let action = if raw.event_type == RawEventType::ButtonPress {
            ButtonAction::Press
        } else {
            ButtonAction::Release
        };

        let common = self.common_builder(raw, device_name)?;
        let mut click_builder = MouseClickBuilder::default();
        click_builder.common = common;
        click_builder.action(action).button_id(raw.detail).button_name(button_name);
        let mut data = Data::new(Entry::MouseClick(click_builder.build()));
        self.attach_common(&mut data, raw);
        Ok(vec![data])
    }

    fn transform_key(&mut self, raw: &RawEvent) -> Result<EventBatch> {
        if !self.registry.contains(raw.device_id) {
            return Ok(Vec::new());
        }

        let device_name = self.registry.name_of(raw.device_id)?.to_string();
        let action = if raw.event_type == RawEventType::KeyRelease {
            ButtonAction::Release
        } else if raw.auto_repeat {
            ButtonAction::Repeat
        } else {
            ButtonAction::Press
        };

        let common = self.common_builder(raw, device_name)?;
        let mut key_builder = KeyBuilder::default();
        key_builder.common = common;
        key_builder
            .action(action)
            .key_code(raw.detail)
            .character(raw.character.clone())
            .key_name(raw.key_name.clone());
        let mut data = Data::new(Entry::Key(key_builder.build()));
        self.attach_common(&mut data, raw);
        Ok(vec![data])
    }

    fn transform_touch(&mut self, raw: &RawEvent) -> Result<EventBatch> {
        if !self.registry.contains(raw.device_id) || raw.pointer_emulated {
            return Ok(Vec::new());
        }

        let device_name = self.registry.name_of(raw.device_id)?.to_string();
        let mut batch = Vec::new();

        let move_common = self.common_builder(raw, device_name.clone())?;
        let mut move_data =
            Data::new(Entry::MouseMove(MouseMoveBuilder { common: move_common, ..Default::default() }.build()));
        self.attach_common(&mut move_data, raw);
        batch.push(move_data);

        let click_action = match raw.event_type {
            RawEventType::TouchBegin => Some(ButtonAction::Press),
            RawEventType::TouchEnd => Some(ButtonAction::Release),
            _ => None,
        };
        if let Some(action) = click_action {
            let common = self.common_builder(raw, device_name)?;
            let mut click_builder = MouseClickBuilder::default();
            click_builder.common = common;
            click_builder.action(action).button_id(raw.detail).button_name(String::new());
            let mut click_data = Data::new(Entry::MouseClick(click_builder.build()));
            self.attach_common(&mut click_data, raw);
            batch.push(click_data);
        }

        Ok(batch)
    }
}
