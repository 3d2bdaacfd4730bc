//! Parameter store plus forward and backward propagation.
//!
//! Matrix orientation is one example per column throughout: inputs are
//! `(features, examples)`, layer ℓ holds weights
//! `(dims[ℓ], dims[ℓ-1])` and a `(dims[ℓ], 1)` bias column broadcast
//! across examples.

use anyhow::{ensure, Result};
use ndarray::prelude::*;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::activation::Activation;

/// Weights and bias of one fully-connected layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub weights: Array2<f64>,
    pub bias: Array2<f64>,
}

/// Forward-pass record for one layer: the layer's input and the
/// pre-activation it produced. Built during `Network::forward`, consumed
/// once by the matching `Network::backward` of the same iteration. The
/// layer's weights are read back from the network itself, which does not
/// change between the two passes.
#[derive(Debug, Clone)]
pub struct LayerCache {
    pub a_prev: Array2<f64>,
    pub z: Array2<f64>,
}

/// Cost gradients for one layer, shaped exactly like its parameters.
#[derive(Debug, Clone)]
pub struct LayerGradients {
    pub d_weights: Array2<f64>,
    pub d_bias: Array2<f64>,
}

/// A feed-forward classifier: ReLU hidden layers, softmax output.
#[derive(Debug, Clone)]
pub struct Network {
    pub dims: Vec<usize>,
    pub layers: Vec<Layer>,
}

/// The affine map `z = w·a + b`, bias broadcast across example columns.
pub fn linear_forward(
    a: &ArrayView2<f64>,
    w: &ArrayView2<f64>,
    b: &ArrayView2<f64>,
) -> Array2<f64> {
    assert_eq!(
        w.ncols(),
        a.nrows(),
        "weight columns ({}) must match input rows ({})",
        w.ncols(),
        a.nrows()
    );
    let z = w.dot(a) + b;
    assert_eq!(z.dim(), (w.nrows(), a.ncols()));
    z
}

/// Backpropagates through the affine map. With `m` examples:
/// `d_w = d_z·a_prevᵗ / m`, `d_b = rowsum(d_z) / m`,
/// `d_a_prev = wᵗ·d_z`.
pub fn linear_backward(
    d_z: &ArrayView2<f64>,
    a_prev: &ArrayView2<f64>,
    w: &ArrayView2<f64>,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let m = a_prev.ncols();
    assert_eq!(
        d_z.ncols(),
        m,
        "gradient covers {} examples but the cached input has {}",
        d_z.ncols(),
        m
    );
    assert_eq!(
        d_z.nrows(),
        w.nrows(),
        "gradient rows ({}) must match weight rows ({})",
        d_z.nrows(),
        w.nrows()
    );
    assert_eq!(
        w.ncols(),
        a_prev.nrows(),
        "weight columns ({}) must match cached input rows ({})",
        w.ncols(),
        a_prev.nrows()
    );
    let d_w = d_z.dot(&a_prev.t()) / m as f64;
    let d_b = d_z.sum_axis(Axis(1)).insert_axis(Axis(1)) / m as f64;
    let d_a_prev = w.t().dot(d_z);
    (d_a_prev, d_w, d_b)
}

/// One layer step: affine map followed by the given activation.
pub fn layer_forward(
    a_prev: &ArrayView2<f64>,
    w: &ArrayView2<f64>,
    b: &ArrayView2<f64>,
    activation: Activation,
) -> (Array2<f64>, LayerCache) {
    let z = linear_forward(a_prev, w, b);
    let a = activation.forward(&z.view());
    let cache = LayerCache {
        a_prev: a_prev.to_owned(),
        z,
    };
    (a, cache)
}

fn max_index(a: &ArrayView1<f64>) -> usize {
    let mut max = a[0];
    let mut max_index = 0;
    for i in 1..a.len() {
        if a[i] > max {
            max = a[i];
            max_index = i;
        }
    }
    max_index
}

impl Network {
    /// Builds a network for the given layer widths. Weights are sampled
    /// from a zero-mean Gaussian scaled by `1/sqrt(fan_in)`, biases start
    /// at zero. Deterministic for a fixed `seed`.
    pub fn new(dims: Vec<usize>, seed: u64) -> Result<Self> {
        ensure!(
            dims.len() >= 2,
            "need at least an input and an output width, got {:?}",
            dims
        );
        ensure!(
            dims.iter().all(|&d| d > 0),
            "layer widths must be positive, got {:?}",
            dims
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(dims.len() - 1);
        for i in 1..dims.len() {
            let scale = 1.0 / (dims[i - 1] as f64).sqrt();
            let weights = Array::from_shape_simple_fn((dims[i], dims[i - 1]), || {
                scale * rng.sample::<f64, _>(StandardNormal)
            });
            let bias = Array::zeros((dims[i], 1));
            layers.push(Layer { weights, bias });
        }
        Ok(Self { dims, layers })
    }

    /// The activation applied by weight layer `index`: ReLU everywhere
    /// except the softmax output layer.
    fn activation_of(&self, index: usize) -> Activation {
        if index == self.layers.len() - 1 {
            Activation::Softmax
        } else {
            Activation::Relu
        }
    }

    /// Forward-propagates a `(features, examples)` batch. Returns the
    /// softmax prediction, `(classes, examples)`, and one cache per
    /// weight layer in layer order.
    pub fn forward(&self, x: &ArrayView2<f64>) -> (Array2<f64>, Vec<LayerCache>) {
        assert_eq!(
            x.nrows(),
            self.dims[0],
            "input has {} rows but the network expects {}",
            x.nrows(),
            self.dims[0]
        );
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut a = x.to_owned();
        for (i, layer) in self.layers.iter().enumerate() {
            let (next, cache) = layer_forward(
                &a.view(),
                &layer.weights.view(),
                &layer.bias.view(),
                self.activation_of(i),
            );
            caches.push(cache);
            a = next;
        }
        (a, caches)
    }

    /// Backpropagates the cost gradient through every layer, consuming
    /// the forward caches in reverse. Returns one gradient record per
    /// layer, in layer order.
    pub fn backward(
        &self,
        prediction: &ArrayView2<f64>,
        truth: &ArrayView2<f64>,
        caches: &[LayerCache],
    ) -> Vec<LayerGradients> {
        assert_eq!(
            caches.len(),
            self.layers.len(),
            "expected one cache per weight layer ({}), got {}",
            self.layers.len(),
            caches.len()
        );
        assert_eq!(
            prediction.dim(),
            truth.dim(),
            "prediction shape {:?} does not match truth shape {:?}",
            prediction.dim(),
            truth.dim()
        );

        // Derivative of the cost with respect to the final activation.
        let d_al = -(truth / prediction - (1.0 - truth) / (1.0 - prediction));

        let mut grads = Vec::with_capacity(self.layers.len());
        let mut d_a = d_al;
        for l in (0..self.layers.len()).rev() {
            let cache = &caches[l];
            let d_z = self.activation_of(l).backward(&d_a.view(), &cache.z.view());
            let (d_a_prev, d_w, d_b) = linear_backward(
                &d_z.view(),
                &cache.a_prev.view(),
                &self.layers[l].weights.view(),
            );
            grads.push(LayerGradients {
                d_weights: d_w,
                d_bias: d_b,
            });
            d_a = d_a_prev;
        }
        grads.reverse();
        grads
    }

    /// Gradient-descent step: `w := w - lr·d_w`, `b := b - lr·d_b`.
    pub fn apply_gradients(&mut self, grads: &[LayerGradients], learning_rate: f64) {
        assert_eq!(
            grads.len(),
            self.layers.len(),
            "expected one gradient per layer ({}), got {}",
            self.layers.len(),
            grads.len()
        );
        for (layer, grad) in self.layers.iter_mut().zip(grads) {
            assert_eq!(
                layer.weights.dim(),
                grad.d_weights.dim(),
                "weight gradient shape {:?} does not match weights {:?}",
                grad.d_weights.dim(),
                layer.weights.dim()
            );
            assert_eq!(
                layer.bias.dim(),
                grad.d_bias.dim(),
                "bias gradient shape {:?} does not match bias {:?}",
                grad.d_bias.dim(),
                layer.bias.dim()
            );
            layer.weights = &layer.weights - learning_rate * &grad.d_weights;
            layer.bias = &layer.bias - learning_rate * &grad.d_bias;
        }
    }

    /// Predicted class for a single example: the index of the largest
    /// output activation.
    pub fn predict(&self, input: &ArrayView1<f64>) -> usize {
        let column = input.to_owned().insert_axis(Axis(1));
        let (output, _) = self.forward(&column.view());
        max_index(&output.column(0))
    }
}
