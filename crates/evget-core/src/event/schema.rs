//! Compile-time field schemas, one per entry kind.
//!
//! Per spec §4.5 / REDESIGN FLAGS: two competing schema representations
//! coexisted in the original (a template `Schema<N, Relations...>` and a
//! runtime linked-vector `Schema`). This crate picks the compile-time
//! option: each kind gets a `&'static [FieldSpec]` naming its fields in
//! emission order, and `fields()` on the corresponding entry struct returns
//! strings in that exact order so schema length and emitted-string count can
//! never drift apart (spec §8 property 2).

use super::types::{FieldSpec, FieldType};

const COMMON: &[FieldSpec] = &[
    FieldSpec::new("interval", FieldType::Interval),
    FieldSpec::new("timestamp", FieldType::Timestamp),
    FieldSpec::new("device_kind", FieldType::String),
    FieldSpec::new("device_name", FieldType::String),
    FieldSpec::new("position_x", FieldType::Double),
    FieldSpec::new("position_y", FieldType::Double),
    FieldSpec::new("focus_window_name", FieldType::String),
    FieldSpec::new("focus_window_position_x", FieldType::Integer),
    FieldSpec::new("focus_window_position_y", FieldType::Integer),
    FieldSpec::new("focus_window_width", FieldType::Integer),
    FieldSpec::new("focus_window_height", FieldType::Integer),
];

/// `MouseMove` carries no fields beyond the common set.
pub const MOUSE_MOVE_SCHEMA: &[FieldSpec] = COMMON;

const MOUSE_CLICK_TAIL: &[FieldSpec] = &[
    FieldSpec::new("action", FieldType::String),
    FieldSpec::new("button_id", FieldType::Integer),
    FieldSpec::new("button_name", FieldType::String),
];

const MOUSE_SCROLL_TAIL: &[FieldSpec] = &[
    FieldSpec::new("vertical_delta", FieldType::Double),
    FieldSpec::new("horizontal_delta", FieldType::Double),
];

const KEY_TAIL: &[FieldSpec] = &[
    FieldSpec::new("action", FieldType::String),
    FieldSpec::new("key_code", FieldType::Integer),
    FieldSpec::new("character", FieldType::String),
    FieldSpec::new("key_name", FieldType::String),
];

const MODIFIER_TAIL: &[FieldSpec] = &[FieldSpec::new("modifier_value", FieldType::String)];

/// Schemas that extend the common fields can't be expressed as a single
/// `const` slice concatenation in stable Rust without `const_concat`-style
/// crates, so `fields()` on each entry stitches common + kind-specific
/// values itself; these slices exist so callers can introspect field counts
/// and names without constructing an entry (used by sink schema validation
/// and by the property tests in spec §8).
pub fn mouse_click_schema() -> Vec<FieldSpec> {
    COMMON.iter().copied().chain(MOUSE_CLICK_TAIL.iter().copied()).collect()
}

pub fn mouse_scroll_schema() -> Vec<FieldSpec> {
    COMMON.iter().copied().chain(MOUSE_SCROLL_TAIL.iter().copied()).collect()
}

pub fn key_schema() -> Vec<FieldSpec> {
    COMMON.iter().copied().chain(KEY_TAIL.iter().copied()).collect()
}

pub fn modifier_schema() -> Vec<FieldSpec> {
    COMMON.iter().copied().chain(MODIFIER_TAIL.iter().copied()).collect()
}
