//! Raw field storage shared by all typed views.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::utils::from_timestamp;

/// Read-only mapping of raw wire keys to JSON values.
///
/// Typed views wrap one of these and never modify it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Map<String, Value>);

impl Fields {
    /// Wraps a raw mapping.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The whole mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Gives the mapping back.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub(crate) fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(value_as_int)
    }

    pub(crate) fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub(crate) fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(value_as_bool)
    }

    pub(crate) fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub(crate) fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.int(key).and_then(from_timestamp)
    }

    pub(crate) fn strings(&self, key: &str) -> Option<Vec<String>> {
        let list = self.get(key)?.as_array()?;
        Some(
            list.iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
        )
    }

    pub(crate) fn ints(&self, key: &str) -> Option<Vec<i64>> {
        let list = self.get(key)?.as_array()?;
        Some(list.iter().filter_map(value_as_int).collect())
    }

    pub(crate) fn object(&self, key: &str) -> Option<Fields> {
        self.get(key)?.as_object().cloned().map(Fields)
    }

    pub(crate) fn objects(&self, key: &str) -> Option<Vec<Fields>> {
        let list = self.get(key)?.as_array()?;
        Some(
            list.iter()
                .filter_map(|item| item.as_object().cloned().map(Fields))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Integers sometimes arrive as integral floats.
pub(crate) fn value_as_int(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|float| float.fract() == 0.0)
            .map(|float| float as i64)
    })
}

/// `wanted` flags arrive either as booleans or as 0/1.
pub(crate) fn value_as_bool(value: &Value) -> Option<bool> {
    value
        .as_bool()
        .or_else(|| value_as_int(value).map(|int| int != 0))
}

/// Declares a typed view over [`Fields`]: the struct, its constructors and raw
/// access.
macro_rules! view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            fields: $crate::fields::Fields,
        }

        impl $name {
            /// Wraps raw fields.
            pub fn new(fields: impl Into<$crate::fields::Fields>) -> Self {
                Self {
                    fields: fields.into(),
                }
            }

            /// Raw value of a wire key, including keys without an accessor.
            pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
                self.fields.get(key)
            }

            /// The underlying fields.
            pub fn fields(&self) -> &$crate::fields::Fields {
                &self.fields
            }
        }

        impl From<$crate::fields::Fields> for $name {
            fn from(fields: $crate::fields::Fields) -> Self {
                Self::new(fields)
            }
        }

        impl From<serde_json::Map<String, serde_json::Value>> for $name {
            fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
                Self::new(map)
            }
        }
    };
}

/// Generates one accessor per entry and the `KEYS` list of a view.
///
/// Each entry is `accessor: kind = "wire-key"`. Legacy spellings are a second
/// entry pointing at the same key, marked `#[deprecated]`.
macro_rules! accessors {
    (@ty int) => { Option<i64> };
    (@ty float) => { Option<f64> };
    (@ty bool) => { Option<bool> };
    (@ty str) => { Option<&str> };
    (@ty date) => { Option<chrono::DateTime<chrono::Utc>> };
    (@ty strings) => { Option<Vec<String>> };
    (@ty ints) => { Option<Vec<i64>> };

    (@get $fields:expr, int, $key:literal) => { $fields.int($key) };
    (@get $fields:expr, float, $key:literal) => { $fields.float($key) };
    (@get $fields:expr, bool, $key:literal) => { $fields.bool($key) };
    (@get $fields:expr, str, $key:literal) => { $fields.str($key) };
    (@get $fields:expr, date, $key:literal) => { $fields.date($key) };
    (@get $fields:expr, strings, $key:literal) => { $fields.strings($key) };
    (@get $fields:expr, ints, $key:literal) => { $fields.ints($key) };

    ($view:ident {
        $( $(#[$attr:meta])* $accessor:ident : $kind:ident = $key:literal ),* $(,)?
    }) => {
        #[allow(missing_docs)]
        impl $view {
            /// Wire keys that have a generated accessor.
            pub const KEYS: &'static [&'static str] = &[$($key),*];

            $(
                $(#[$attr])*
                pub fn $accessor(&self) -> $crate::fields::accessors!(@ty $kind) {
                    $crate::fields::accessors!(@get self.fields, $kind, $key)
                }
            )*
        }
    };
}

pub(crate) use {accessors, view};
