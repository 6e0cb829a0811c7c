use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-ordered samples of one matched label-set.
pub type Series = Vec<f64>;

/// Series assumed to share one time grid.
pub type Matrix = Vec<Series>;

/// Result of evaluating a formula or one of its sub-expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Matrix),
}

impl Value {
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Vector(_) => "vector",
            Value::Matrix(_) => "matrix",
        }
    }

    pub fn into_vector(self) -> Option<Vec<f64>> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Vector(values)
    }
}

impl From<Matrix> for Value {
    fn from(matrix: Matrix) -> Self {
        Value::Matrix(matrix)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{}", v),
            Value::Vector(v) => write!(f, "{:?}", v),
            Value::Matrix(m) => write!(f, "{:?}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Scalar(4.0)).unwrap(), "4.0");
        assert_eq!(
            serde_json::to_string(&Value::Vector(vec![1.0, 2.5])).unwrap(),
            "[1.0,2.5]"
        );
        assert_eq!(
            serde_json::to_string(&Value::Matrix(vec![vec![1.0], vec![2.0]])).unwrap(),
            "[[1.0],[2.0]]"
        );
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::from(vec![1.0, 2.0]);
        assert_eq!(value.shape(), "vector");
        assert_eq!(value.into_vector(), Some(vec![1.0, 2.0]));
        assert_eq!(Value::from(3.0).into_vector(), None);
    }
}
