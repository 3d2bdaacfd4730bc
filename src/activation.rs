//! Activation functions and their gradients.
//!
//! The set is closed: sigmoid, ReLU, and softmax. Every function operates
//! on a `(units, examples)` matrix, one example per column.

use anyhow::{bail, Result};
use ndarray::prelude::*;

/// A layer nonlinearity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    Relu,
    Softmax,
}

impl Activation {
    /// Resolves a name to an activation, rejecting unknown tags up front.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sigmoid" => Ok(Self::Sigmoid),
            "relu" => Ok(Self::Relu),
            "softmax" => Ok(Self::Softmax),
            _ => bail!("unsupported activation '{name}'"),
        }
    }

    /// Applies the activation to a pre-activation matrix.
    ///
    /// Softmax normalizes each example column independently.
    pub fn forward(&self, z: &ArrayView2<f64>) -> Array2<f64> {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + z.mapv(|v| (-v).exp())),
            Self::Relu => z.mapv(|v| v.max(0.0)),
            Self::Softmax => {
                let mut a = Array2::zeros(z.raw_dim());
                for (j, col) in z.axis_iter(Axis(1)).enumerate() {
                    let e = col.mapv(f64::exp);
                    let total = e.sum();
                    a.column_mut(j).assign(&(e / total));
                }
                a
            }
        }
    }

    /// Backpropagates an upstream activation gradient `d_a` through the
    /// nonlinearity, given the cached pre-activation `z`. Returns the
    /// gradient with respect to `z`, same shape as `z`.
    pub fn backward(&self, d_a: &ArrayView2<f64>, z: &ArrayView2<f64>) -> Array2<f64> {
        assert_eq!(
            d_a.dim(),
            z.dim(),
            "upstream gradient shape {:?} does not match cached pre-activation shape {:?}",
            d_a.dim(),
            z.dim()
        );
        match self {
            Self::Sigmoid => {
                let s = Self::Sigmoid.forward(z);
                d_a * &(&s * &(1.0 - &s))
            }
            Self::Relu => d_a * &z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            // per-column Jacobian-vector product of softmax
            Self::Softmax => {
                let mut d_z = Array2::zeros(z.raw_dim());
                for (j, z_col) in z.axis_iter(Axis(1)).enumerate() {
                    let e = z_col.mapv(f64::exp);
                    let s = &e / e.sum();
                    let upstream = d_a.column(j);
                    let weighted = s.dot(&upstream);
                    let mut col = upstream.to_owned();
                    col -= weighted;
                    col *= &s;
                    d_z.column_mut(j).assign(&col);
                }
                d_z
            }
        }
    }
}
