use crate::math::matrix::Matrix;
use crate::optim::optimizer::UpdateRule;
use crate::optim::state::Slot;

/// Adam (Adaptive Moment Estimation).
///
/// `m = b1 m + (1 - b1) g`, `v = b2 v + (1 - b2) g²`, then
/// `p -= lr * m̂ / sqrt(v̂ + epsilon)` with `m̂ = m / (1 - b1^t)` and
/// `v̂ = v / (1 - b2^t)`. `t` counts steps over the whole run, starting at 1.
#[derive(Debug, Clone, Copy)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

/// Nesterov-accelerated Adam.
///
/// Same moments and denominator as [`Adam`]; the numerator is
/// `b1 * m̂ + (1 - b1) / (1 - b1^t) * g`.
#[derive(Debug, Clone, Copy)]
pub struct Nadam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

/// Bias-correction denominators `(1 - b1^t, 1 - b2^t)`.
pub fn bias_corrections(beta1: f64, beta2: f64, step_num: usize) -> (f64, f64) {
    let t = step_num as i32;
    (1.0 - beta1.powi(t), 1.0 - beta2.powi(t))
}

/// Advances both moments and returns them.
fn update_moments(slot: &mut Slot, param: &Matrix, grad: &Matrix, beta1: f64, beta2: f64) -> (Matrix, Matrix) {
    let m = slot.first_or_zeros(param);
    *m = m.zip_map(grad, |m, g| beta1 * m + (1.0 - beta1) * g);
    let m = m.clone();

    let v = slot.second_or_zeros(param);
    *v = v.zip_map(grad, |v, g| beta2 * v + (1.0 - beta2) * g * g);

    (m, v.clone())
}

impl UpdateRule for Adam {
    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, step_num: usize) {
        let Self { learning_rate: lr, beta1, beta2, epsilon } = *self;
        let (bc1, bc2) = bias_corrections(beta1, beta2, step_num);
        let (m, v) = update_moments(slot, param, grad, beta1, beta2);

        let delta = m.zip_map(&v, |m, v| lr * (m / bc1) / (v / bc2 + epsilon).sqrt());
        param.sub_assign(&delta);
    }
}

impl UpdateRule for Nadam {
    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, step_num: usize) {
        let Self { learning_rate: lr, beta1, beta2, epsilon } = *self;
        let (bc1, bc2) = bias_corrections(beta1, beta2, step_num);
        let (m, v) = update_moments(slot, param, grad, beta1, beta2);

        let numerator = m.zip_map(grad, |m, g| beta1 * (m / bc1) + (1.0 - beta1) / bc1 * g);
        let delta = numerator.zip_map(&v, |n, v| lr * n / (v / bc2 + epsilon).sqrt());
        param.sub_assign(&delta);
    }
}
