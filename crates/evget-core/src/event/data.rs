//! [`Data`]: one primary entry plus zero-or-more attached modifiers.

use super::entry::{Common, Key, Modifier, MouseClick, MouseMove, MouseScroll};
use super::schema;
use super::types::{EntryKind, FieldSpec, ModifierValue};

/// The primary entry a [`Data`] carries, tagged so sinks can dispatch
/// without matching every field.
#[derive(Debug, Clone)]
pub enum Entry {
    MouseMove(MouseMove),
    MouseClick(MouseClick),
    MouseScroll(MouseScroll),
    Key(Key),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::MouseMove(_) => EntryKind::MouseMove,
            Entry::MouseClick(_) => EntryKind::MouseClick,
            Entry::MouseScroll(_) => EntryKind::MouseScroll,
            Entry::Key(_) => EntryKind::Key,
        }
    }

    pub fn common(&self) -> &Common {
        match self {
            Entry::MouseMove(e) => &e.common,
            Entry::MouseClick(e) => &e.common,
            Entry::MouseScroll(e) => &e.common,
            Entry::Key(e) => &e.common,
        }
    }

    /// Serialized field values in schema order (spec §4.5/§8 property 2).
    pub fn fields(&self) -> Vec<String> {
        match self {
            Entry::MouseMove(e) => e.fields(),
            Entry::MouseClick(e) => e.fields(),
            Entry::MouseScroll(e) => e.fields(),
            Entry::Key(e) => e.fields(),
        }
    }

    /// Field names in the same order as [`Entry::fields`], for sinks that
    /// pair a name with each emitted value (spec §6 JSON layout).
    pub fn schema(&self) -> Vec<FieldSpec> {
        match self {
            Entry::MouseMove(_) => schema::MOUSE_MOVE_SCHEMA.to_vec(),
            Entry::MouseClick(_) => schema::mouse_click_schema(),
            Entry::MouseScroll(_) => schema::mouse_scroll_schema(),
            Entry::Key(_) => schema::key_schema(),
        }
    }
}

/// One primary [`Entry`] plus the [`Modifier`]s active when it was produced.
///
/// Invariant (spec §3): every modifier attached to a `Data` shares the
/// primary's `interval` and `timestamp`. `attach_modifiers` enforces this by
/// construction rather than trusting the caller.
#[derive(Debug, Clone)]
pub struct Data {
    pub primary: Entry,
    pub modifiers: Vec<Modifier>,
}

impl Data {
    pub fn new(primary: Entry) -> Self {
        Self { primary, modifiers: Vec::new() }
    }

    pub fn kind(&self) -> EntryKind {
        self.primary.kind()
    }

    /// Attach one [`Modifier`] per set bit in a decoded modifier mask,
    /// stamping each with the primary's `interval`/`timestamp`/device fields
    /// so the shared-timestamp invariant always holds.
    pub fn attach_modifiers(&mut self, values: impl IntoIterator<Item = ModifierValue>) {
        let common = self.primary.common().clone();
        self.modifiers.extend(values.into_iter().map(|modifier_value| Modifier {
            common: common.clone(),
            modifier_value,
        }));
    }

}

/// An ordered group of [`Data`] flushed together to sinks (spec §3 "Event
/// batch"). A drained `LockingVector<Data>` becomes one `EventBatch`;
/// concatenation across flushes preserves push order but is never implied
/// across batches (spec §4.10's ordering guarantee).
pub type EventBatch = Vec<Data>;
