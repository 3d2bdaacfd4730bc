//! Cost evaluation for one-hot targets.

use ndarray::prelude::*;

/// Mean per-example cross-entropy summed across every output unit:
/// `-(1/m)·Σ[y·ln(a) + (1-y)·ln(1-a)]`, reduced over both the class and
/// the example axis.
///
/// Every output unit contributes both its true-class and its complement
/// term, unlike the single-label categorical form (see
/// [`categorical_cost`]). No clamping is applied: a prediction entry of
/// exactly 0 or 1 yields a non-finite result that the caller sees as-is.
pub fn cost(prediction: &ArrayView2<f64>, truth: &ArrayView2<f64>) -> f64 {
    assert_eq!(
        prediction.dim(),
        truth.dim(),
        "prediction shape {:?} does not match truth shape {:?}",
        prediction.dim(),
        truth.dim()
    );
    let m = truth.ncols() as f64;
    let per_unit =
        truth * &prediction.mapv(f64::ln) + (1.0 - truth) * (1.0 - prediction).mapv(f64::ln);
    -per_unit.sum() / m
}

/// Single-label categorical cross-entropy, `-(1/m)·Σ y·ln(a)`: only the
/// true-class log-probability of each example contributes. Offered as an
/// alternative to [`cost`]; the training loop does not use it. Equally
/// unclamped.
pub fn categorical_cost(prediction: &ArrayView2<f64>, truth: &ArrayView2<f64>) -> f64 {
    assert_eq!(
        prediction.dim(),
        truth.dim(),
        "prediction shape {:?} does not match truth shape {:?}",
        prediction.dim(),
        truth.dim()
    );
    let m = truth.ncols() as f64;
    -(truth * &prediction.mapv(f64::ln)).sum() / m
}
