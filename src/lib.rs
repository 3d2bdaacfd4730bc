//! Full-batch gradient-descent trainer for fully-connected feed-forward
//! classifiers.
//!
//! The crate covers the training engine only: seeded parameter
//! initialization, forward propagation through ReLU hidden layers into a
//! softmax output layer, cross-entropy cost, manual backpropagation, and
//! an iterative training loop with tolerance-based early stopping. Data
//! loading, label encoding, and plotting are left to the caller, which
//! hands in a `(features, examples)` input matrix and a
//! `(classes, examples)` one-hot label matrix.
//!
//! # Modules
//!
//! - `activation`: the closed set of nonlinearities and their gradients
//! - `network`: parameter store, forward and backward propagation
//! - `cost`: cost evaluation
//! - `config`: training configuration and validation
//! - `train`: the training loop

pub mod activation;
pub mod config;
pub mod cost;
pub mod network;
pub mod train;

pub use activation::Activation;
pub use config::TrainConfig;
pub use cost::{categorical_cost, cost};
pub use network::{Layer, LayerCache, LayerGradients, Network};
pub use train::{train, StopReason, TrainOutcome};
