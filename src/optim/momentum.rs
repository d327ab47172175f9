use crate::math::matrix::Matrix;
use crate::optim::optimizer::UpdateRule;
use crate::optim::state::Slot;

/// Heavy-ball momentum: `v = gamma * v + lr * g; p -= v`.
#[derive(Debug, Clone, Copy)]
pub struct Momentum {
    pub learning_rate: f64,
    pub gamma: f64,
}

/// Nesterov momentum. Parameters are first moved by `gamma * v_prev`, the
/// gradient is taken at that point, then the momentum update follows.
#[derive(Debug, Clone, Copy)]
pub struct Nesterov {
    pub learning_rate: f64,
    pub gamma: f64,
}

fn velocity_step(param: &mut Matrix, grad: &Matrix, slot: &mut Slot, learning_rate: f64, gamma: f64) {
    let velocity = slot.first_or_zeros(param);
    *velocity = velocity.zip_map(grad, |v, g| gamma * v + learning_rate * g);
    param.sub_assign(velocity);
}

impl UpdateRule for Momentum {
    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, _step_num: usize) {
        velocity_step(param, grad, slot, self.learning_rate, self.gamma);
    }
}

impl UpdateRule for Nesterov {
    fn lookahead(&self, param: &mut Matrix, slot: &Slot) {
        // No velocity yet means a zero shift.
        if let Some(velocity) = slot.first() {
            param.sub_assign(&velocity.scale(self.gamma));
        }
    }

    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, _step_num: usize) {
        velocity_step(param, grad, slot, self.learning_rate, self.gamma);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(x: f64) -> Matrix {
        Matrix::from_data(vec![vec![x]])
    }

    #[test]
    fn velocity_accumulates() {
        let rule = Momentum { learning_rate: 0.1, gamma: 0.9 };
        let mut p = scalar(1.0);
        let mut slot = Slot::default();

        rule.update(&mut p, &scalar(1.0), &mut slot, 1);
        assert!((p.data[0][0] - 0.9).abs() < 1e-12);

        // v = 0.9 * 0.1 + 0.1 = 0.19
        rule.update(&mut p, &scalar(1.0), &mut slot, 2);
        assert!((slot.first().unwrap().data[0][0] - 0.19).abs() < 1e-12);
        assert!((p.data[0][0] - 0.71).abs() < 1e-12);
    }

    #[test]
    fn zero_gradient_decays_the_velocity() {
        let rule = Momentum { learning_rate: 0.1, gamma: 0.5 };
        let mut p = scalar(1.0);
        let mut slot = Slot::default();
        rule.update(&mut p, &scalar(2.0), &mut slot, 1);

        let zero = scalar(0.0);
        let mut last_move = f64::INFINITY;
        for step in 2..60 {
            let before = p.data[0][0];
            rule.update(&mut p, &zero, &mut slot, step);
            let moved = (p.data[0][0] - before).abs();
            assert!(moved <= last_move);
            last_move = moved;
        }
        assert!(last_move < 1e-15);
        assert!(slot.first().unwrap().max_abs() < 1e-15);
    }

    #[test]
    fn nesterov_lookahead_uses_previous_velocity() {
        let rule = Nesterov { learning_rate: 0.1, gamma: 0.5 };
        let mut p = scalar(1.0);
        let mut slot = Slot::default();

        // First call: no velocity, no shift.
        rule.lookahead(&mut p, &slot);
        assert_eq!(p.data[0][0], 1.0);

        rule.update(&mut p, &scalar(1.0), &mut slot, 1);
        assert!((p.data[0][0] - 0.9).abs() < 1e-12);

        rule.lookahead(&mut p, &slot);
        assert!((p.data[0][0] - 0.85).abs() < 1e-12);
    }
}
