use super::{stats, Function};
use crate::{
    error::{AnalyzeError, Result},
    value::{Matrix, Value},
};

/// A flat `&[f64] -> f64` reduction lifted over value shapes.
///
/// * `Vector` reduces to a `Scalar`.
/// * `Matrix` reduces column-wise to a `Vector` with one element per sample
///   index. Every series must have the same length.
#[derive(Debug, Clone, Copy)]
pub struct Reduction {
    name: &'static str,
    reduce: fn(&[f64]) -> f64,
}

impl Reduction {
    pub const fn new(name: &'static str, reduce: fn(&[f64]) -> f64) -> Self {
        Self { name, reduce }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn reduce_vector(&self, values: &[f64]) -> Result<f64> {
        if values.is_empty() {
            return Err(AnalyzeError::ArgumentNotMatch(format!(
                "'{}' received an empty vector",
                self.name
            )));
        }
        Ok((self.reduce)(values))
    }

    fn reduce_columns(&self, matrix: &Matrix) -> Result<Vec<f64>> {
        let Some(first) = matrix.first() else {
            return Ok(Vec::new());
        };
        let width = first.len();

        if let Some((series, ragged)) = matrix
            .iter()
            .enumerate()
            .find(|(_, series)| series.len() != width)
        {
            return Err(AnalyzeError::ShapeMismatch {
                series,
                expected: width,
                found: ragged.len(),
            });
        }

        let mut column = Vec::with_capacity(matrix.len());
        Ok((0..width)
            .map(|j| {
                column.clear();
                column.extend(matrix.iter().map(|series| series[j]));
                (self.reduce)(&column)
            })
            .collect())
    }
}

impl Function for Reduction {
    fn call(&self, args: &[Value]) -> Result<Value> {
        let [arg] = args else {
            return Err(AnalyzeError::ArgumentNotMatch(format!(
                "'{}' takes exactly one argument, got {}",
                self.name,
                args.len()
            )));
        };

        match arg {
            Value::Vector(values) => self.reduce_vector(values).map(Value::Scalar),
            Value::Matrix(matrix) => self.reduce_columns(matrix).map(Value::Vector),
            Value::Scalar(_) => Err(AnalyzeError::ArgumentNotMatch(format!(
                "'{}' does not accept a {}",
                self.name,
                arg.shape()
            ))),
        }
    }
}

pub fn builtins() -> [Reduction; 7] {
    [
        Reduction::new("mean", stats::mean),
        Reduction::new("max", stats::max),
        Reduction::new("min", stats::min),
        Reduction::new("std", stats::std),
        Reduction::new("sum", stats::sum),
        Reduction::new("count", stats::count),
        Reduction::new("median", stats::median),
    ]
}
