// End-to-end training scenarios.

use digitnet::{train, Network, StopReason, TrainConfig};
use ndarray::prelude::*;

// 4 features, 2 classes, 10 examples, linearly separable.
fn fixed_batch() -> (Array2<f64>, Array2<f64>) {
    let x = array![
        [0.9, 0.1, 0.8, 0.2, 1.0, 0.0, 0.7, 0.3, 0.9, 0.2],
        [0.8, 0.2, 0.9, 0.1, 0.7, 0.3, 1.0, 0.0, 0.8, 0.1],
        [0.1, 0.9, 0.2, 0.8, 0.0, 1.0, 0.3, 0.7, 0.2, 0.9],
        [0.2, 0.8, 0.1, 0.9, 0.3, 0.7, 0.0, 1.0, 0.1, 0.8]
    ];
    let y = array![
        [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
    ];
    (x, y)
}

#[test]
fn fixed_scenario_runs_the_full_hundred_iterations() {
    let (x, y) = fixed_batch();
    let config = TrainConfig {
        layer_dims: vec![4, 3, 2],
        learning_rate: 0.01,
        max_iterations: 100,
        tolerance: 0.0,
    };
    let outcome = train(&x.view(), &y.view(), &config, 42).unwrap();

    assert_eq!(outcome.cost_history.len(), 100);
    assert_eq!(outcome.stop, StopReason::MaxIterationsReached);
    assert!(outcome.cost_history.iter().all(|c| c.is_finite()));
    assert!(
        outcome.cost_history[99] < outcome.cost_history[0],
        "final cost {} did not drop below initial cost {}",
        outcome.cost_history[99],
        outcome.cost_history[0]
    );

    // parameter shapes survive training untouched
    assert_eq!(outcome.network.layers[0].weights.dim(), (3, 4));
    assert_eq!(outcome.network.layers[0].bias.dim(), (3, 1));
    assert_eq!(outcome.network.layers[1].weights.dim(), (2, 3));
    assert_eq!(outcome.network.layers[1].bias.dim(), (2, 1));
}

#[test]
fn cost_falls_on_a_separable_two_class_problem() {
    // 2 classes, 2 features, 20 examples
    let m = 20;
    let x = Array2::from_shape_fn((2, m), |(feature, j)| {
        let hot = j % 2;
        if feature == hot {
            0.85 + 0.005 * j as f64
        } else {
            0.15 - 0.005 * j as f64
        }
    });
    let y = Array2::from_shape_fn((2, m), |(class, j)| if class == j % 2 { 1.0 } else { 0.0 });

    let config = TrainConfig {
        layer_dims: vec![2, 4, 2],
        learning_rate: 0.05,
        max_iterations: 300,
        tolerance: 0.0,
    };
    let outcome = train(&x.view(), &y.view(), &config, 3).unwrap();
    let first = outcome.cost_history[0];
    let last = outcome.cost_history[outcome.cost_history.len() - 1];
    assert!(
        last < first,
        "cost went from {first} to {last} without improving"
    );
}

#[test]
fn early_stop_truncates_the_history() {
    let (x, y) = fixed_batch();
    let config = TrainConfig {
        layer_dims: vec![4, 3, 2],
        learning_rate: 0.01,
        max_iterations: 100,
        tolerance: 1e9,
    };
    let outcome = train(&x.view(), &y.view(), &config, 42).unwrap();
    assert_eq!(outcome.stop, StopReason::Converged);
    assert_eq!(outcome.cost_history.len(), 2);
    assert!(outcome.cost_history.len() < config.max_iterations);
}

#[test]
fn trained_network_still_predicts_single_columns() {
    let (x, y) = fixed_batch();
    let config = TrainConfig {
        layer_dims: vec![4, 3, 2],
        learning_rate: 0.05,
        max_iterations: 200,
        tolerance: 0.0,
    };
    let outcome = train(&x.view(), &y.view(), &config, 42).unwrap();
    let class = outcome.network.predict(&x.column(0));
    assert!(class < 2);
}

#[test]
fn training_respects_a_json_config() {
    let (x, y) = fixed_batch();
    let config: TrainConfig = serde_json::from_str(
        r#"{
            "layer_dims": [4, 3, 2],
            "learning_rate": 0.01,
            "max_iterations": 5,
            "tolerance": 0.0
        }"#,
    )
    .unwrap();
    config.validate().unwrap();
    let outcome = train(&x.view(), &y.view(), &config, 1).unwrap();
    assert_eq!(outcome.cost_history.len(), 5);
}

#[test]
fn a_fresh_network_and_a_trained_network_share_shapes() {
    let (x, y) = fixed_batch();
    let config = TrainConfig {
        layer_dims: vec![4, 3, 2],
        learning_rate: 0.01,
        max_iterations: 10,
        tolerance: 0.0,
    };
    let fresh = Network::new(config.layer_dims.clone(), 42).unwrap();
    let outcome = train(&x.view(), &y.view(), &config, 42).unwrap();
    for (a, b) in fresh.layers.iter().zip(&outcome.network.layers) {
        assert_eq!(a.weights.dim(), b.weights.dim());
        assert_eq!(a.bias.dim(), b.bias.dim());
    }
}
