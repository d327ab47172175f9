use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;
use crate::network::init::InitPolicy;

/// Parameters of one fully connected layer.
///
/// `weights` is `(size, input_size)` and `biases` is `(size, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer{
    pub weights: Matrix,
    pub biases: Matrix,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(size: usize, input_size: usize, policy: InitPolicy, rng: &mut R) -> Layer {
        let weights = policy.sample(size, input_size, input_size, size, rng);
        let biases = policy.sample(size, 1, input_size, size, rng);

        Layer {
            weights,
            biases,
        }
    }

    pub fn size(&self) -> usize {
        self.weights.rows
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    /// Pre-activation `a = w · h + b` for a column batch `h`.
    pub fn pre_activation(&self, input: &Matrix) -> Matrix {
        self.weights.dot(input).add_column(&self.biases)
    }
}
