//! Named-field record values.
//!
//! Field lookup is by name only, case-normalized to uppercase. Names
//! starting with the sentinel `_` are hidden: excluded from default
//! enumeration and from the rendered form. A record can carry an
//! [`ObjectAttributes`] slot marking it as an instance of a scripted or
//! native class.

use crate::value::{Value, CMP_UNORDERED};
use std::collections::BTreeMap;
use std::fmt;

/// Field names starting with this are hidden from default enumeration.
pub const HIDDEN_PREFIX: char = '_';

/// Class identity carried by records that represent object instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub class_name: String,
    pub object_id: u64,
    pub native: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordValue {
    fields: BTreeMap<String, Value>,
    attrs: Option<ObjectAttributes>,
}

impl RecordValue {
    pub fn new() -> Self {
        RecordValue::default()
    }

    pub fn normalize_key(name: &str) -> String {
        name.trim().to_uppercase()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(&Self::normalize_key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(&Self::normalize_key(name))
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(Self::normalize_key(name), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(&Self::normalize_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&Self::normalize_key(name))
    }

    /// Field names in sorted order, hidden fields only on request.
    pub fn member_names(&self, include_hidden: bool) -> Vec<String> {
        self.fields
            .keys()
            .filter(|k| include_hidden || !k.starts_with(HIDDEN_PREFIX))
            .cloned()
            .collect()
    }

    /// Visible field count.
    pub fn member_count(&self) -> usize {
        self.fields
            .keys()
            .filter(|k| !k.starts_with(HIDDEN_PREFIX))
            .count()
    }

    /// Total field count, hidden included.
    pub fn size(&self) -> usize {
        self.fields.len()
    }

    pub fn attrs(&self) -> Option<&ObjectAttributes> {
        self.attrs.as_ref()
    }

    pub fn set_attrs(&mut self, attrs: Option<ObjectAttributes>) {
        self.attrs = attrs;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Strict field-wise equality, hidden fields included.
    pub fn matches(&self, other: &RecordValue) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(name, value)| {
                other.fields.get(name).is_some_and(|o| value.matches(o))
            })
    }

    /// Records of unequal shape are unordered; equal shapes compare their
    /// values in field-name order.
    pub fn compare(&self, other: &RecordValue) -> i32 {
        let names: Vec<&String> = self.fields.keys().collect();
        let other_names: Vec<&String> = other.fields.keys().collect();
        if names != other_names {
            return CMP_UNORDERED;
        }
        for name in names {
            match self.fields[name].compare(&other.fields[name]) {
                0 => continue,
                ord => return ord,
            }
        }
        0
    }

    pub(crate) fn copy_at_depth(&self, depth: usize) -> RecordValue {
        RecordValue {
            fields: self
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.copy_at_depth(depth + 1)))
                .collect(),
            // Attributes copy field by field, they hold no nested values.
            attrs: self.attrs.clone(),
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .filter(|(k, _)| !k.starts_with(HIDDEN_PREFIX))
            .map(|(k, v)| format!("{}: {}", k, v.display_quoted()))
            .collect();
        write!(f, "{{{}}}", fields.join(", "))
    }
}
