//! Serde helpers for the provider's loosely shaped payloads.
//!
//! The same DTOs decode REST JSON and SOAP XML (converted to JSON values by
//! [`crate::xml`]), so every helper here accepts both shapes: lists may be an
//! array, a lone object or `null`; numbers may be strings; string lists may be
//! wrapped as `{"string": ...}`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::validate;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// A list that may arrive as an array, a single element, or `null`.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(OneOrMany::Many(items)) => Ok(items),
        Some(OneOrMany::One(item)) => Ok(vec![item]),
    }
}

/// A list of strings, e.g. delivery options or opening hours.
///
/// Decodes `"a"`, `["a", "b"]`, `{"string": "a"}`, `{"string": ["a", "b"]}` and
/// `null`. Always encodes as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }
}

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        StringList(values)
    }
}

impl Serialize for StringList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let mut out = Vec::new();
        collect_strings(&value, &mut out).map_err(D::Error::custom)?;
        Ok(StringList(out))
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) -> Result<(), String> {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => {
            out.push(s.clone());
            Ok(())
        }
        Value::Number(n) => {
            out.push(n.to_string());
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(|item| collect_strings(item, out)),
        Value::Object(map) => match map.get("string") {
            Some(inner) if map.len() == 1 => collect_strings(inner, out),
            _ => Err(format!("expected a string list, got {value}")),
        },
        Value::Bool(_) => Err(format!("expected a string list, got {value}")),
    }
}

fn scalar_to_string(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a scalar, got {other}")),
    }
}

/// Optional string that may arrive as a number or boolean.
pub fn opt_string_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Optional number that may arrive as a string (SOAP) or be empty.
pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid number: {s}"))),
    }
}

pub fn opt_u32_lenient<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer: {s}"))),
    }
}

/// `dd-mm-YYYY` on the wire.
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&validate::format_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        validate::parse_date(&raw).map_err(D::Error::custom)
    }
}

pub mod opt_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_str(&validate::format_date(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)? {
            Some(raw) if !raw.trim().is_empty() => validate::parse_date(&raw).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

/// `dd-mm-YYYY HH:MM:SS` on the wire.
pub mod datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&validate::format_datetime(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        validate::parse_datetime(&raw).map_err(D::Error::custom)
    }
}

pub mod opt_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&validate::format_datetime(*dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        match scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)? {
            Some(raw) if !raw.trim().is_empty() => {
                validate::parse_datetime(&raw).map(Some).map_err(D::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

/// `HH:MM:SS` on the wire.
pub mod time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&validate::format_time(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        validate::parse_time(&raw).map_err(D::Error::custom)
    }
}

pub mod opt_time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_str(&validate::format_time(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match scalar_to_string(Value::deserialize(deserializer)?).map_err(D::Error::custom)? {
            Some(raw) if !raw.trim().is_empty() => validate::parse_time(&raw).map(Some).map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}
