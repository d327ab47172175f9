use crate::math::matrix::Matrix;
use crate::optim::optimizer::UpdateRule;
use crate::optim::state::Slot;

/// `s = beta * s + (1 - beta) * g²; p -= lr * g / sqrt(s + epsilon)`.
#[derive(Debug, Clone, Copy)]
pub struct RmsProp {
    pub learning_rate: f64,
    pub beta: f64,
    pub epsilon: f64,
}

impl UpdateRule for RmsProp {
    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, _step_num: usize) {
        let Self { learning_rate: lr, beta, epsilon } = *self;

        let mean_square = slot.first_or_zeros(param);
        *mean_square = mean_square.zip_map(grad, |s, g| beta * s + (1.0 - beta) * g * g);

        let delta = grad.zip_map(mean_square, |g, s| lr * g / (s + epsilon).sqrt());
        param.sub_assign(&delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_normalises_by_gradient_scale() {
        let rule = RmsProp { learning_rate: 0.01, beta: 0.9, epsilon: 0.0 };
        let mut p = Matrix::from_data(vec![vec![0.0, 0.0]]);
        let g = Matrix::from_data(vec![vec![4.0, -0.25]]);
        let mut slot = Slot::default();
        rule.update(&mut p, &g, &mut slot, 1);

        // s = 0.1 g², so each step is lr * sign(g) / sqrt(0.1).
        let step = 0.01 / 0.1f64.sqrt();
        assert!((p.data[0][0] + step).abs() < 1e-12);
        assert!((p.data[0][1] - step).abs() < 1e-12);
    }

    #[test]
    fn zero_gradient_stops_moving() {
        let rule = RmsProp { learning_rate: 0.1, beta: 0.99, epsilon: 1e-7 };
        let mut p = Matrix::from_data(vec![vec![1.0]]);
        let mut slot = Slot::default();
        rule.update(&mut p, &Matrix::from_data(vec![vec![3.0]]), &mut slot, 1);

        let before = p.clone();
        let zero = Matrix::zeros(1, 1);
        for step in 2..10 {
            rule.update(&mut p, &zero, &mut slot, step);
        }
        assert_eq!(p, before);
    }
}
