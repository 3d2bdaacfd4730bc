//! The training loop: forward, cost, backward, update, repeat.

use anyhow::Result;
use log::{debug, info};
use ndarray::prelude::*;

use crate::config::TrainConfig;
use crate::cost::cost;
use crate::network::Network;

/// Why a training run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Consecutive costs differed by less than the tolerance.
    Converged,
    /// The configured iteration cap was reached.
    MaxIterationsReached,
}

/// Result of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub network: Network,
    /// One cost per completed iteration, in order.
    pub cost_history: Vec<f64>,
    pub stop: StopReason,
}

/// Trains a freshly initialized network on a full batch.
///
/// `x` is `(features, examples)`, `y` is `(classes, examples)` one-hot;
/// both must match the configured layer widths and cover the same
/// examples. Each iteration runs forward propagation, evaluates and
/// records the cost, backpropagates, and applies the gradient-descent
/// update. After the first iteration, the run stops early once the
/// absolute difference between consecutive costs drops below the
/// configured tolerance.
///
/// A non-finite cost is not detected here: it lands in the history and
/// the following gradients unchanged, and the run keeps going until a
/// stopping rule fires.
pub fn train(
    x: &ArrayView2<f64>,
    y: &ArrayView2<f64>,
    config: &TrainConfig,
    seed: u64,
) -> Result<TrainOutcome> {
    config.validate()?;
    assert_eq!(
        x.nrows(),
        config.layer_dims[0],
        "input has {} feature rows but layer_dims starts at {}",
        x.nrows(),
        config.layer_dims[0]
    );
    assert_eq!(
        y.nrows(),
        config.layer_dims[config.layer_dims.len() - 1],
        "labels have {} class rows but layer_dims ends at {}",
        y.nrows(),
        config.layer_dims[config.layer_dims.len() - 1]
    );
    assert_eq!(
        x.ncols(),
        y.ncols(),
        "inputs cover {} examples but labels cover {}",
        x.ncols(),
        y.ncols()
    );

    let mut network = Network::new(config.layer_dims.clone(), seed)?;
    let mut cost_history = Vec::with_capacity(config.max_iterations);
    info!(
        "training a {:?} network on {} examples (lr {}, max {} iterations)",
        config.layer_dims,
        x.ncols(),
        config.learning_rate,
        config.max_iterations
    );

    let mut stop = StopReason::MaxIterationsReached;
    for iteration in 0..config.max_iterations {
        let (prediction, caches) = network.forward(x);
        let current = cost(&prediction.view(), y);
        debug!("iteration {iteration}: cost {current}");
        cost_history.push(current);

        let grads = network.backward(&prediction.view(), y, &caches);
        network.apply_gradients(&grads, config.learning_rate);

        if iteration > 0 && (current - cost_history[iteration - 1]).abs() < config.tolerance {
            info!("stopped early at iteration {iteration}: cost delta within tolerance");
            stop = StopReason::Converged;
            break;
        }
    }
    info!(
        "training done after {} iterations ({:?}), final cost {}",
        cost_history.len(),
        stop,
        cost_history[cost_history.len() - 1]
    );

    Ok(TrainOutcome {
        network,
        cost_history,
        stop,
    })
}
