//! Typed event records: schemas, builders, the `Data` aggregate, and the
//! string serialization helpers every sink shares (spec §4.5).

pub mod data;
pub mod entry;
pub mod schema;
pub mod serialize;
pub mod types;

pub use data::{Data, Entry, EventBatch};
pub use entry::{
    Common, CommonBuilder, Key, KeyBuilder, Modifier, MouseClick, MouseClickBuilder, MouseMove,
    MouseMoveBuilder, MouseScroll, MouseScrollBuilder,
};
pub use types::{ButtonAction, DeviceKind, EntryKind, FieldSpec, FieldType, ModifierValue};
