// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property values that can be read from and written to an animation target.

use serde::{Deserialize, Serialize};

/// Value of a single animatable property.
///
/// Numeric arrays use `f64` so that `NaN` can mark an "unset" entry. During
/// track preparation such entries inherit the matching entry of the final
/// keyframe. Integer-only array storage cannot express that sentinel and is
/// not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Scalar number
    Number(f64),
    /// Free text, including color expressions such as `#ff0000`
    Text(String),
    /// Flat numeric sequence
    Array1(Vec<f64>),
    /// Sequence of numeric sequences (points, matrices)
    Array2(Vec<Vec<f64>>),
}

/// Array dimensionality of a value or track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrayDim {
    /// Not an array
    #[default]
    Scalar,
    /// One level of nesting
    One,
    /// Two levels of nesting
    Two,
}

impl PropValue {
    /// Get the array dimensionality of this value
    pub fn array_dim(&self) -> ArrayDim {
        match self {
            Self::Number(_) | Self::Text(_) => ArrayDim::Scalar,
            Self::Array1(_) => ArrayDim::One,
            Self::Array2(_) => ArrayDim::Two,
        }
    }

    /// Get as number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as text if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get as flat array if possible
    pub fn as_array1(&self) -> Option<&[f64]> {
        match self {
            Self::Array1(v) => Some(v),
            _ => None,
        }
    }

    /// Get as nested array if possible
    pub fn as_array2(&self) -> Option<&[Vec<f64>]> {
        match self {
            Self::Array2(v) => Some(v),
            _ => None,
        }
    }

    /// True for arrays that hold no number to interpolate
    pub(crate) fn is_empty_array(&self) -> bool {
        match self {
            Self::Array1(v) => v.is_empty(),
            Self::Array2(v) => v.first().map_or(true, Vec::is_empty),
            Self::Number(_) | Self::Text(_) => false,
        }
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<f64>> for PropValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Array1(value)
    }
}

impl From<Vec<Vec<f64>>> for PropValue {
    fn from(value: Vec<Vec<f64>>) -> Self {
        Self::Array2(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_dim() {
        assert_eq!(PropValue::from(1.0).array_dim(), ArrayDim::Scalar);
        assert_eq!(PropValue::from("red").array_dim(), ArrayDim::Scalar);
        assert_eq!(PropValue::from(vec![1.0, 2.0]).array_dim(), ArrayDim::One);
        assert_eq!(PropValue::from(vec![vec![1.0]]).array_dim(), ArrayDim::Two);
    }

    #[test]
    fn test_untagged_ron() {
        let values: Vec<PropValue> =
            ron::from_str("[1.5, \"#fff\", [1.0, 2.0], [[0.0, 1.0]]]").unwrap();
        assert_eq!(values[0], PropValue::Number(1.5));
        assert_eq!(values[1], PropValue::Text("#fff".to_owned()));
        assert_eq!(values[2], PropValue::Array1(vec![1.0, 2.0]));
        assert_eq!(values[3], PropValue::Array2(vec![vec![0.0, 1.0]]));
    }

    #[test]
    fn test_empty_arrays() {
        assert!(PropValue::Array1(Vec::new()).is_empty_array());
        assert!(PropValue::Array2(vec![Vec::new()]).is_empty_array());
        assert!(!PropValue::Number(0.0).is_empty_array());
    }
}
