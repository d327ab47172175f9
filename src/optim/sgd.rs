use crate::math::matrix::Matrix;
use crate::optim::optimizer::UpdateRule;
use crate::optim::state::Slot;

/// Plain gradient descent: `p -= lr * g`. Keeps no state.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl UpdateRule for Sgd {
    fn update(&self, param: &mut Matrix, grad: &Matrix, _slot: &mut Slot, _step_num: usize) {
        param.sub_assign(&grad.scale(self.learning_rate));
    }
}
