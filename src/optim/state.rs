use crate::math::matrix::Matrix;

/// Persistent buffers for one parameter tensor.
///
/// `first` is the velocity (momentum, nesterov), the squared-gradient
/// average (rmsprop) or the first moment (adam, nadam); `second` is the
/// adam/nadam second moment. A buffer that has never been written reads as
/// zeros of the parameter's shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    first: Option<Matrix>,
    second: Option<Matrix>,
}

impl Slot {
    pub fn first(&self) -> Option<&Matrix> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&Matrix> {
        self.second.as_ref()
    }

    pub fn first_or_zeros(&mut self, like: &Matrix) -> &mut Matrix {
        self.first.get_or_insert_with(|| Matrix::zeros_like(like))
    }

    pub fn second_or_zeros(&mut self, like: &Matrix) -> &mut Matrix {
        self.second.get_or_insert_with(|| Matrix::zeros_like(like))
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerState {
    pub weights: Slot,
    pub biases: Slot,
}

/// Optimizer buffers for a whole network, indexed like `Network::layers`.
/// Layers get a state record the first time an update touches them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizerState {
    layers: Vec<LayerState>,
}

impl OptimizerState {
    pub fn layer(&self, index: usize) -> Option<&LayerState> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut LayerState {
        if self.layers.len() <= index {
            self.layers.resize_with(index + 1, LayerState::default);
        }
        &mut self.layers[index]
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.weights.is_empty() && l.biases.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_appear_on_first_use() {
        let mut state = OptimizerState::default();
        assert!(state.is_empty());
        assert!(state.layer(2).is_none());

        let like = Matrix::zeros(2, 3);
        let v = state.layer_mut(2).weights.first_or_zeros(&like);
        assert_eq!(v.shape(), (2, 3));
        v.data[0][0] = 1.0;

        assert!(!state.is_empty());
        assert_eq!(state.layer(2).unwrap().weights.first().unwrap().data[0][0], 1.0);
        assert!(state.layer(0).unwrap().weights.is_empty());
        assert!(state.layer(2).unwrap().weights.second().is_none());

        state.clear();
        assert!(state.layer(2).is_none());
    }
}
