mod common;

use common::{all_params, numerical_gradient, relative_error, Param};
use handgrad::{Activation, InitPolicy, Matrix, Network};
use rand::{rngs::StdRng, SeedableRng};

const TOLERANCE: f64 = 1e-4;

fn network(activation: Activation, seed: u64) -> Network {
    let mut net = Network::new(3, 2);
    net.add_layer(4).unwrap();
    net.activation = activation;
    net.initialise(InitPolicy::Random, &mut StdRng::seed_from_u64(seed));
    net
}

fn batch() -> (Matrix, Vec<usize>) {
    let x = Matrix::from_columns(&[
        vec![0.9, -0.3, 0.5],
        vec![-0.7, 0.8, 0.1],
        vec![0.2, 0.6, -0.9],
        vec![-0.4, -0.5, 0.35],
        vec![0.65, 0.15, 0.75],
    ]);
    (x, vec![1, 0, 0, 1, 1])
}

fn analytic(grads: &handgrad::Gradients, param: Param) -> f64 {
    match param {
        Param::Weight(l, r, c) => grads.layers[l].weights.data[r][c],
        Param::Bias(l, r) => grads.layers[l].biases.data[r][0],
    }
}

/// The backward pass sums over the batch while the loss is a mean, so the
/// analytic gradient equals `batch * d(loss)/dθ`.
fn check_batch(activation: Activation) {
    let net = network(activation, 21);
    let (x, y) = batch();
    let n = y.len() as f64;
    let grads = net.gradients(&x, &y, 0.0).unwrap();

    for param in all_params(&net) {
        let a = analytic(&grads, param);
        let numeric = n * numerical_gradient(&net, &x, &y, 0.0, param);
        let err = relative_error(a, numeric);
        assert!(err < TOLERANCE, "{activation} {param:?}: analytic {a} vs numeric {numeric} (rel {err})");
    }
}

#[test]
fn sigmoid_gradients_match_finite_differences() {
    check_batch(Activation::Sigmoid);
}

#[test]
fn tanh_gradients_match_finite_differences() {
    check_batch(Activation::Tanh);
}

#[test]
fn relu_gradients_match_finite_differences() {
    check_batch(Activation::ReLU);
}

/// With one sample the L2 term `(l2 / 1) * w` is exactly the derivative of
/// `(l2 / 2) * ||w||²`, so regularised gradients compare directly.
#[test]
fn regularised_single_sample_gradients_match() {
    for activation in [Activation::Sigmoid, Activation::Tanh, Activation::ReLU] {
        let net = network(activation, 4);
        let x = Matrix::column_vector(&[0.3, -0.8, 0.6]);
        let y = [1];
        let grads = net.gradients(&x, &y, 0.05).unwrap();

        for param in all_params(&net) {
            let a = analytic(&grads, param);
            let numeric = numerical_gradient(&net, &x, &y, 0.05, param);
            let err = relative_error(a, numeric);
            assert!(err < TOLERANCE, "{activation} {param:?}: analytic {a} vs numeric {numeric}");
        }
    }
}
