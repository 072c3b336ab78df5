// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation targets.
//!
//! The animator never reflects over an object. Anything it animates exposes
//! string-keyed access through [`AnimationTarget`].

use crate::value::PropValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// String-keyed property access on an animated object
pub trait AnimationTarget {
    /// Read the current value of a property
    fn get(&self, key: &str) -> Option<PropValue>;

    /// Write a property
    fn set(&mut self, key: &str, value: PropValue);
}

/// Insertion-ordered property bag.
///
/// Serves both as a ready-made target and as the value map passed to
/// keyframe declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    props: IndexMap<String, PropValue>,
}

impl PropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a property
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.props.insert(key.into(), value.into());
    }

    /// Borrow a property
    pub fn value(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Get a property as number
    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(PropValue::as_number)
    }

    /// Get a property as text
    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(PropValue::as_text)
    }

    /// Property names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl AnimationTarget for PropertyMap {
    fn get(&self, key: &str) -> Option<PropValue> {
        self.props.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: PropValue) {
        match self.props.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.props.insert(key.to_owned(), value);
            }
        }
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            props: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
