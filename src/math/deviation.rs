//! Pointwise comparison of aligned series.
//!
//! Both kernels compare by row position, not by matching `x` values: callers
//! guarantee the two series live on the same grid. A length mismatch yields
//! `None` so the caller can decide whether it excludes a candidate or aborts.

use nalgebra::DVector;

/// Sum of squared errors `Σ (a[k] - b[k])²`.
pub fn sse(a: &[f64], b: &[f64]) -> Option<f64> {
    let diff = difference(a, b)?;
    Some(diff.norm_squared())
}

/// Largest absolute pointwise gap `max |a[k] - b[k]|`.
pub fn max_abs_deviation(a: &[f64], b: &[f64]) -> Option<f64> {
    let diff = difference(a, b)?;
    Some(diff.amax())
}

fn difference(a: &[f64], b: &[f64]) -> Option<DVector<f64>> {
    if a.len() != b.len() {
        return None;
    }
    let a = DVector::from_row_slice(a);
    let b = DVector::from_row_slice(b);
    Some(a - b)
}
