// Key/value view of the decoded descriptor

use std::fmt;

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One decoded descriptor value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Label of an enumerated code (raw number for unknown codes)
    Label(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
}

impl MetaValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Float(v) => Some(*v),
            MetaValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) | MetaValue::Label(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            MetaValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Int(v) => write!(f, "{}", v),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Text(s) | MetaValue::Label(s) => f.write_str(s),
            MetaValue::Bool(v) => write!(f, "{}", v),
            MetaValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.9f")),
        }
    }
}

impl From<i16> for MetaValue {
    fn from(v: i16) -> Self {
        MetaValue::Int(v as i64)
    }
}

impl From<i32> for MetaValue {
    fn from(v: i32) -> Self {
        MetaValue::Int(v as i64)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<u16> for MetaValue {
    fn from(v: u16) -> Self {
        MetaValue::Int(v as i64)
    }
}

impl From<f32> for MetaValue {
    fn from(v: f32) -> Self {
        MetaValue::Float(v as f64)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for MetaValue {
    fn from(v: NaiveDateTime) -> Self {
        MetaValue::Timestamp(v)
    }
}

/// Descriptor fields keyed by their template names, in layout order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(&'static str, MetaValue)>,
}

impl Metadata {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Metadata {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, key: &'static str, value: impl Into<MetaValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub(crate) fn insert_label(&mut self, key: &'static str, label: impl Into<String>) {
        self.insert(key, MetaValue::Label(label.into()));
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
