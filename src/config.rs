//! Training configuration.
//!
//! A `TrainConfig` is usually built in code, but it can also be parsed
//! from a JSON file:
//!
//! ```json
//! {
//!   "layer_dims": [784, 500, 400, 300, 100, 10],
//!   "learning_rate": 0.0005,
//!   "max_iterations": 35,
//!   "tolerance": 0.3
//! }
//! ```

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Hyperparameters of one training run.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainConfig {
    /// Layer widths, input first, output last.
    pub layer_dims: Vec<usize>,

    /// Step size for the gradient-descent update.
    pub learning_rate: f64,

    /// Hard cap on training iterations.
    pub max_iterations: usize,

    /// Early-stop threshold on the absolute difference between
    /// consecutive costs.
    pub tolerance: f64,
}

impl TrainConfig {
    /// Reads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading training config {}", path.display()))?;
        let config: TrainConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing training config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field for semantic validity.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.layer_dims.len() >= 2,
            "layer_dims needs an input and an output width, got {:?}",
            self.layer_dims
        );
        ensure!(
            self.layer_dims.iter().all(|&d| d > 0),
            "layer widths must be positive, got {:?}",
            self.layer_dims
        );
        ensure!(
            self.learning_rate.is_finite() && self.learning_rate > 0.0,
            "learning_rate must be positive and finite, got {}",
            self.learning_rate
        );
        ensure!(self.max_iterations > 0, "max_iterations must be at least 1");
        ensure!(
            self.tolerance.is_finite() && self.tolerance >= 0.0,
            "tolerance must be non-negative and finite, got {}",
            self.tolerance
        );
        Ok(())
    }
}
