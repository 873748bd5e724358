//! Canonical string conversions for each [`super::types::FieldType`].
//!
//! Every sink that needs a string representation (the JSON sink, the
//! `Display` impl used by the stdout sink, row formatting for the DB sink)
//! goes through these helpers so the conventions in spec §4.5 only live in
//! one place: `None` becomes the empty string, timestamps are RFC-3339 with
//! nanoseconds and a timezone, intervals are signed nanosecond integers,
//! doubles use standard `%f`-style formatting, and enums use their fixed
//! spellings (already implemented as each enum's `Display`).

use chrono::{DateTime, SecondsFormat, Utc};

/// `None` becomes `""`; `Some(v)` becomes `v.to_string()`.
pub fn opt_string<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// RFC-3339 with nanosecond precision and an explicit timezone offset.
pub fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn opt_timestamp(value: &Option<DateTime<Utc>>) -> String {
    value.map(timestamp).unwrap_or_default()
}

/// Signed nanosecond count.
pub fn interval(value: i64) -> String {
    value.to_string()
}

pub fn opt_interval(value: &Option<i64>) -> String {
    value.map(interval).unwrap_or_default()
}

/// Standard `%f`-style formatting (six fractional digits).
pub fn double(value: f64) -> String {
    format!("{value:.6}")
}

pub fn opt_double(value: &Option<f64>) -> String {
    value.map(double).unwrap_or_default()
}

pub fn opt_integer<T: ToString>(value: &Option<T>) -> String {
    opt_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_string_none_is_empty() {
        assert_eq!(opt_string::<i32>(&None), "");
    }

    #[test]
    fn opt_string_some_uses_display() {
        assert_eq!(opt_string(&Some(42)), "42");
    }

    #[test]
    fn double_uses_six_fractional_digits() {
        assert_eq!(double(1.5), "1.500000");
    }

    #[test]
    fn interval_preserves_sign() {
        assert_eq!(interval(-7), "-7");
    }

    #[test]
    fn timestamp_includes_nanos_and_timezone() {
        let ts = DateTime::<Utc>::from_timestamp(0, 123).unwrap();
        let formatted = timestamp(ts);
        assert!(formatted.ends_with('Z'));
        assert!(formatted.contains('.'));
    }
}
