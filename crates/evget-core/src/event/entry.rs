//! Per-kind entry structs and their builders.
//!
//! Per spec §4.5 / REDESIGN FLAGS, this deliberately skips a single generic,
//! template-heavy builder: each kind is a plain struct with a matching
//! builder that has one setter per schema field. Setters return `&mut Self`
//! so call sites can chain; an unset field serializes as the empty string
//! (spec §4.5's positional-alignment invariant), never as a missing column.

use chrono::{DateTime, Utc};

use super::schema;
use super::serialize::{opt_double, opt_integer, opt_string, opt_timestamp};
use super::types::{ButtonAction, DeviceKind, EntryKind, ModifierValue};

/// Fields shared by every entry kind, including `Modifier`.
#[derive(Debug, Clone)]
pub struct Common {
    pub interval: i64,
    pub timestamp: DateTime<Utc>,
    pub device_kind: DeviceKind,
    pub device_name: String,
    pub position_x: f64,
    pub position_y: f64,
    pub focus_window_name: Option<String>,
    pub focus_window_position_x: Option<i32>,
    pub focus_window_position_y: Option<i32>,
    pub focus_window_width: Option<i32>,
    pub focus_window_height: Option<i32>,
}

impl Common {
    fn fields(&self) -> Vec<String> {
        vec![
            self.interval.to_string(),
            opt_timestamp(&Some(self.timestamp)),
            self.device_kind.to_string(),
            self.device_name.clone(),
            opt_double(&Some(self.position_x)),
            opt_double(&Some(self.position_y)),
            opt_string(&self.focus_window_name),
            opt_integer(&self.focus_window_position_x),
            opt_integer(&self.focus_window_position_y),
            opt_integer(&self.focus_window_width),
            opt_integer(&self.focus_window_height),
        ]
    }
}

/// Builder for [`Common`]; embedded in every kind-specific builder below.
#[derive(Debug, Default, Clone)]
pub struct CommonBuilder {
    interval: i64,
    timestamp: Option<DateTime<Utc>>,
    device_kind: Option<DeviceKind>,
    device_name: String,
    position_x: f64,
    position_y: f64,
    focus_window_name: Option<String>,
    focus_window_position_x: Option<i32>,
    focus_window_position_y: Option<i32>,
    focus_window_width: Option<i32>,
    focus_window_height: Option<i32>,
}

impl CommonBuilder {
    pub fn interval(&mut self, value: i64) -> &mut Self {
        self.interval = value;
        self
    }

    pub fn timestamp(&mut self, value: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(value);
        self
    }

    pub fn device_kind(&mut self, value: DeviceKind) -> &mut Self {
        self.device_kind = Some(value);
        self
    }

    pub fn device_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.device_name = value.into();
        self
    }

    pub fn position(&mut self, x: f64, y: f64) -> &mut Self {
        self.position_x = x;
        self.position_y = y;
        self
    }

    pub fn focus_window(
        &mut self,
        name: Option<String>,
        x: Option<i32>,
        y: Option<i32>,
        width: Option<i32>,
        height: Option<i32>,
    ) -> &mut Self {
        self.focus_window_name = name;
        self.focus_window_position_x = x;
        self.focus_window_position_y = y;
        self.focus_window_width = width;
        self.focus_window_height = height;
        self
    }

    fn build(&self) -> Common {
        Common {
            interval: self.interval,
            timestamp: self.timestamp.unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap()),
            device_kind: self.device_kind.unwrap_or(DeviceKind::Mouse),
            device_name: self.device_name.clone(),
            position_x: self.position_x,
            position_y: self.position_y,
            focus_window_name: self.focus_window_name.clone(),
            focus_window_position_x: self.focus_window_position_x,
            focus_window_position_y: self.focus_window_position_y,
            focus_window_width: self.focus_window_width,
            focus_window_height: self.focus_window_height,
        }
    }
}

/// One active keyboard modifier, attached to a parent entry. Never appears
/// standalone in storage output; always carried inside a [`super::data::Data`].
#[derive(Debug, Clone)]
pub struct Modifier {
    pub common: Common,
    pub modifier_value: ModifierValue,
}

impl Modifier {
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.common.fields();
        fields.push(self.modifier_value.to_string());
        fields
    }

    pub fn schema_len(&self) -> usize {
        schema::modifier_schema().len()
    }
}

macro_rules! entry_kind {
    ($name:ident, $builder:ident, $kind:expr, { $($field:ident: $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub common: Common,
            $(pub $field: $ty,)*
        }

        impl $name {
            pub const KIND: EntryKind = $kind;
        }

        #[derive(Debug, Default)]
        pub struct $builder {
            pub common: CommonBuilder,
            $($field: Option<$ty>,)*
        }

        impl $builder {
            pub fn common(&mut self) -> &mut CommonBuilder {
                &mut self.common
            }
        }
    };
}

entry_kind!(MouseMove, MouseMoveBuilder, EntryKind::MouseMove, {});

impl MouseMove {
    pub fn fields(&self) -> Vec<String> {
        self.common.fields()
    }
}

impl MouseMoveBuilder {
    pub fn build(&self) -> MouseMove {
        MouseMove { common: self.common.build() }
    }
}

entry_kind!(MouseClick, MouseClickBuilder, EntryKind::MouseClick, {
    action: ButtonAction,
    button_id: i32,
    button_name: String,
});

impl MouseClick {
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.common.fields();
        fields.push(self.action.to_string());
        fields.push(self.button_id.to_string());
        fields.push(self.button_name.clone());
        fields
    }
}

impl MouseClickBuilder {
    pub fn action(&mut self, value: ButtonAction) -> &mut Self {
        self.action = Some(value);
        self
    }

    pub fn button_id(&mut self, value: i32) -> &mut Self {
        self.button_id = Some(value);
        self
    }

    pub fn button_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.button_name = Some(value.into());
        self
    }

    pub fn build(&self) -> MouseClick {
        MouseClick {
            common: self.common.build(),
            action: self.action.unwrap_or(ButtonAction::Press),
            button_id: self.button_id.unwrap_or_default(),
            button_name: self.button_name.clone().unwrap_or_default(),
        }
    }
}

entry_kind!(MouseScroll, MouseScrollBuilder, EntryKind::MouseScroll, {
    vertical_delta: f64,
    horizontal_delta: f64,
});

impl MouseScroll {
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.common.fields();
        fields.push(opt_double(&Some(self.vertical_delta)));
        fields.push(opt_double(&Some(self.horizontal_delta)));
        fields
    }
}

impl MouseScrollBuilder {
    pub fn vertical_delta(&mut self, value: f64) -> &mut Self {
        self.vertical_delta = Some(value);
        self
    }

    pub fn horizontal_delta(&mut self, value: f64) -> &mut Self {
        self.horizontal_delta = Some(value);
        self
    }

    pub fn build(&self) -> MouseScroll {
        MouseScroll {
            common: self.common.build(),
            vertical_delta: self.vertical_delta.unwrap_or(0.0),
            horizontal_delta: self.horizontal_delta.unwrap_or(0.0),
        }
    }
}

entry_kind!(Key, KeyBuilder, EntryKind::Key, {
    action: ButtonAction,
    key_code: i32,
    character: String,
    key_name: String,
});

impl Key {
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.common.fields();
        fields.push(self.action.to_string());
        fields.push(self.key_code.to_string());
        fields.push(self.character.clone());
        fields.push(self.key_name.clone());
        fields
    }
}

impl KeyBuilder {
    pub fn action(&mut self, value: ButtonAction) -> &mut Self {
        self.action = Some(value);
        self
    }

    pub fn key_code(&mut self, value: i32) -> &mut Self {
        self.key_code = Some(value);
        self
    }

    pub fn character(&mut self, value: impl Into<String>) -> &mut Self {
        self.character = Some(value.into());
        self
    }

    pub fn key_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.key_name = Some(value.into());
        self
    }

    pub fn build(&self) -> Key {
        Key {
            common: self.common.build(),
            action: self.action.unwrap_or(ButtonAction::Press),
            key_code: self.key_code.unwrap_or_default(),
            character: self.character.clone().unwrap_or_default(),
            key_name: self.key_name.clone().unwrap_or_default(),
        }
    }
}
