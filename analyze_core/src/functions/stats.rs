//! Unweighted reductions over a flat sample sequence.
//!
//! Callers guarantee a non-empty input.

/// Centred on the first sample so a constant input returns that sample
/// exactly.
pub fn mean(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return f64::NAN;
    };
    let offset: f64 = values.iter().map(|v| v - first).sum();
    first + offset / values.len() as f64
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Sample standard deviation (divides by `n - 1`); zero for fewer than two
/// samples.
pub fn std(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let mean = mean(values);
    let (squares, deviation) = values.iter().fold((0.0, 0.0), |(sq, dev), v| {
        let d = v - mean;
        (sq + d * d, dev + d)
    });
    // Compensated two-pass: subtracting (sum d)^2 / n cancels rounding in `mean`.
    let variance = (squares - deviation * deviation / n as f64) / (n - 1) as f64;
    variance.max(0.0).sqrt()
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn count(values: &[f64]) -> f64 {
    values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
