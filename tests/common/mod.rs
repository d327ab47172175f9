#![allow(dead_code)]

use handgrad::{Matrix, Network};

pub const FD_STEP: f64 = 1e-5;

/// Which parameter of a layer to perturb.
#[derive(Debug, Clone, Copy)]
pub enum Param {
    Weight(usize, usize, usize),
    Bias(usize, usize),
}

fn entry(net: &mut Network, param: Param) -> &mut f64 {
    match param {
        Param::Weight(layer, r, c) => &mut net.layers[layer].weights.data[r][c],
        Param::Bias(layer, r) => &mut net.layers[layer].biases.data[r][0],
    }
}

/// Central difference of the mean loss with respect to one parameter.
pub fn numerical_gradient(net: &Network, x: &Matrix, y: &[usize], l2: f64, param: Param) -> f64 {
    let mut probe = net.clone();
    let original = *entry(&mut probe, param);

    *entry(&mut probe, param) = original + FD_STEP;
    let plus = probe.loss(x, y, l2).unwrap();
    *entry(&mut probe, param) = original - FD_STEP;
    let minus = probe.loss(x, y, l2).unwrap();

    (plus - minus) / (2.0 * FD_STEP)
}

/// Every parameter position of `net`, layer by layer.
pub fn all_params(net: &Network) -> Vec<Param> {
    let mut params = Vec::new();
    for (l, layer) in net.layers.iter().enumerate() {
        for r in 0..layer.weights.rows {
            for c in 0..layer.weights.cols {
                params.push(Param::Weight(l, r, c));
            }
            params.push(Param::Bias(l, r));
        }
    }
    params
}

pub fn relative_error(analytic: f64, numeric: f64) -> f64 {
    (analytic - numeric).abs() / (analytic.abs() + numeric.abs()).max(1e-3)
}

pub fn max_param_diff(a: &Network, b: &Network) -> f64 {
    a.layers
        .iter()
        .zip(b.layers.iter())
        .map(|(la, lb)| {
            let w = (la.weights.clone() - lb.weights.clone()).max_abs();
            let b = (la.biases.clone() - lb.biases.clone()).max_abs();
            w.max(b)
        })
        .fold(0.0, f64::max)
}
