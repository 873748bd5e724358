//! Enumerations shared across every entry kind.

use std::fmt;

/// Logical class of input device. Immutable per `device_id` for the
/// device's lifetime in the [`crate::registry::DeviceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Mouse,
    Keyboard,
    Touchpad,
    Touchscreen,
}

impl DeviceKind {
    /// Canonical spelling used by every serialization helper.
    pub const fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Mouse => "Mouse",
            DeviceKind::Keyboard => "Keyboard",
            DeviceKind::Touchpad => "Touchpad",
            DeviceKind::Touchscreen => "Touchscreen",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a button or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Press,
    Release,
    Repeat,
}

impl ButtonAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            ButtonAction::Press => "Press",
            ButtonAction::Release => "Release",
            ButtonAction::Repeat => "Repeat",
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One active keyboard modifier. Multiple may be active concurrently; each
/// active bit in a raw event's modifier mask becomes one [`ModifierValue`]
/// attached to the entry it modifies.
///
/// Bit order matches the platform (X11-style) modifier mask convention this
/// is distilled from: `Shift=1<<0, CapsLock=1<<1, Control=1<<2, Alt=1<<3,
/// NumLock=1<<4, Mod3=1<<5, Super=1<<6, Mod5=1<<7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierValue {
    Shift,
    CapsLock,
    Control,
    Alt,
    NumLock,
    Mod3,
    Super,
    Mod5,
}

impl ModifierValue {
    pub const fn as_str(self) -> &'static str {
        match self {
            ModifierValue::Shift => "Shift",
            ModifierValue::CapsLock => "CapsLock",
            ModifierValue::Control => "Control",
            ModifierValue::Alt => "Alt",
            ModifierValue::NumLock => "NumLock",
            ModifierValue::Mod3 => "Mod3",
            ModifierValue::Super => "Super",
            ModifierValue::Mod5 => "Mod5",
        }
    }

    /// Bit position within the platform modifier mask.
    const fn bit(self) -> u32 {
        match self {
            ModifierValue::Shift => 0,
            ModifierValue::CapsLock => 1,
            ModifierValue::Control => 2,
            ModifierValue::Alt => 3,
            ModifierValue::NumLock => 4,
            ModifierValue::Mod3 => 5,
            ModifierValue::Super => 6,
            ModifierValue::Mod5 => 7,
        }
    }

    const ALL: [ModifierValue; 8] = [
        ModifierValue::Shift,
        ModifierValue::CapsLock,
        ModifierValue::Control,
        ModifierValue::Alt,
        ModifierValue::NumLock,
        ModifierValue::Mod3,
        ModifierValue::Super,
        ModifierValue::Mod5,
    ];

    /// Decode every set bit in a raw platform modifier mask into the
    /// `ModifierValue`s it represents, in stable (lowest-bit-first) order.
    pub fn decode_mask(mask: u32) -> Vec<ModifierValue> {
        Self::ALL
            .into_iter()
            .filter(|modifier| mask & (1 << modifier.bit()) != 0)
            .collect()
    }
}

impl fmt::Display for ModifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag carried by every [`crate::event::data::Data`] so sinks can dispatch
/// on the primary entry's kind without matching the full enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    MouseMove,
    MouseClick,
    MouseScroll,
    Key,
    Modifier,
}

impl EntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryKind::MouseMove => "MouseMove",
            EntryKind::MouseClick => "MouseClick",
            EntryKind::MouseScroll => "MouseScroll",
            EntryKind::Key => "Key",
            EntryKind::Modifier => "Modifier",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type drawn from `{String, Integer, Double, Timestamp, Interval}` a
/// schema field's value is serialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Double,
    Timestamp,
    Interval,
}

/// One `(field_name, field_type)` pair in a compile-time event schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A modifier appears in `decode_mask(mask)` iff its bit is set in
        /// `mask`, for any mask value.
        #[test]
        fn decode_mask_matches_bit_membership(mask in any::<u32>()) {
            let decoded = ModifierValue::decode_mask(mask);
            for modifier in ModifierValue::ALL {
                let bit_set = mask & (1 << modifier.bit()) != 0;
                prop_assert_eq!(decoded.contains(&modifier), bit_set);
            }
        }
    }
}
