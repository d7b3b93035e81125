//! Numeric payload carried by every keyframe.

use serde::{Deserialize, Serialize};

/// The type tag of a [`NumericValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
}

/// A boolean, integer or floating-point parameter value.
///
/// In JSON a value is written as a bare literal: `true`, `3`, `0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl NumericValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            NumericValue::Bool(_) => ValueKind::Bool,
            NumericValue::Int(_) => ValueKind::Int,
            NumericValue::Float(_) => ValueKind::Float,
        }
    }

    /// Non-zero numbers read as `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            NumericValue::Bool(b) => b,
            NumericValue::Int(i) => i != 0,
            NumericValue::Float(d) => d != 0.0,
        }
    }

    /// Floats round to the nearest integer.
    pub fn as_i64(&self) -> i64 {
        match *self {
            NumericValue::Bool(b) => b as i64,
            NumericValue::Int(i) => i,
            NumericValue::Float(d) => d.round() as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            NumericValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            NumericValue::Int(i) => i as f64,
            NumericValue::Float(d) => d,
        }
    }
}

impl From<bool> for NumericValue {
    fn from(b: bool) -> Self {
        NumericValue::Bool(b)
    }
}

impl From<i64> for NumericValue {
    fn from(i: i64) -> Self {
        NumericValue::Int(i)
    }
}

impl From<f64> for NumericValue {
    fn from(d: f64) -> Self {
        NumericValue::Float(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_constructor() {
        assert_eq!(NumericValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(NumericValue::from(7_i64).kind(), ValueKind::Int);
        assert_eq!(NumericValue::from(0.25).kind(), ValueKind::Float);
    }

    #[test]
    fn cross_type_reads() {
        assert_eq!(NumericValue::Float(2.6).as_i64(), 3);
        assert_eq!(NumericValue::Int(-4).as_f64(), -4.0);
        assert!(NumericValue::Int(5).as_bool());
        assert!(!NumericValue::Float(0.0).as_bool());
        assert_eq!(NumericValue::Bool(true).as_f64(), 1.0);
    }

    #[test]
    fn json_literals_pick_the_matching_variant() {
        let values: Vec<NumericValue> = serde_json::from_str("[true, 3, 0.5]").unwrap();
        assert_eq!(
            values,
            vec![
                NumericValue::Bool(true),
                NumericValue::Int(3),
                NumericValue::Float(0.5)
            ]
        );
    }
}
