use crate::error::{NnError, Result};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Batch-summed gradient of one layer's parameters, shaped like the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub weights: Matrix,
    pub biases: Matrix,
}

/// Gradients for every layer, `layers[i]` belonging to `network.layers[i]`.
///
/// Per-sample contributions are summed over the batch; the L2 term
/// `(l2 / batch) * w` is added once to the summed weight gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub layers: Vec<LayerGradients>,
    pub batch_size: usize,
}

impl Network {
    /// Backpropagates cross-entropy loss through a forward pass over `input`.
    pub fn gradients(&self, input: &Matrix, labels: &[usize], l2_reg_param: f64) -> Result<Gradients> {
        self.validate_batch(input, labels)?;

        let cache = self.forward(input)?;
        let batch_size = cache.batch_size();
        let depth = cache.depth();
        let l2_scale = l2_reg_param / batch_size as f64;

        let mut layers = Vec::with_capacity(depth);
        // δ_L = softmax - one_hot
        let mut delta = CrossEntropyLoss::derivative(cache.probabilities(), labels);

        for i in (1..=depth).rev() {
            let layer = &self.layers[i - 1];

            let mut weights = delta.dot(&cache.h(i - 1).transpose());
            if l2_reg_param != 0.0 {
                weights = weights + layer.weights.scale(l2_scale);
            }
            let biases = delta.sum_columns();

            if i > 1 {
                let upstream = layer.weights.transpose().dot(&delta);
                delta = upstream.hadamard(&self.activation.gradient(cache.h(i - 1)));
            }

            layers.push(LayerGradients { weights, biases });
        }
        layers.reverse();

        Ok(Gradients { layers, batch_size })
    }

    /// Mean cross-entropy over the batch plus `(l2 / 2) * Σ ||w||²`.
    pub fn loss(&self, input: &Matrix, labels: &[usize], l2_reg_param: f64) -> Result<f64> {
        self.check_labels(input, labels)?;
        let probabilities = self.predict(input)?;
        Ok(self.loss_from_probabilities(&probabilities, labels, l2_reg_param))
    }

    /// Same as `loss` for probabilities already computed by `predict`.
    pub fn loss_from_probabilities(&self, probabilities: &Matrix, labels: &[usize], l2_reg_param: f64) -> f64 {
        CrossEntropyLoss::loss(probabilities, labels)
            + 0.5 * l2_reg_param * self.weight_norm_squared()
    }

    /// Checks everything `gradients` needs before any work starts.
    pub(crate) fn validate_batch(&self, input: &Matrix, labels: &[usize]) -> Result<()> {
        self.check_input(input)?;
        self.check_labels(input, labels)?;
        if labels.is_empty() {
            return Err(NnError::Dataset("cannot backpropagate an empty batch".to_owned()));
        }
        Ok(())
    }

    fn check_labels(&self, input: &Matrix, labels: &[usize]) -> Result<()> {
        if labels.len() != input.cols {
            return Err(NnError::ShapeMismatch {
                what: "label count",
                expected: input.cols,
                got: labels.len(),
            });
        }
        let classes = self.output_size();
        match labels.iter().find(|&&label| label >= classes) {
            Some(&label) => Err(NnError::LabelOutOfRange { label, classes }),
            None => Ok(()),
        }
    }
}
