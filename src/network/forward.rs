use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Output scores are clipped to ±this before the softmax.
const SOFTMAX_CLIP: f64 = 700.0;

/// Every intermediate of one forward pass, kept for backpropagation.
///
/// Layers are numbered from 1 to `L`. `h(0)` is the input batch, `a(i)` the
/// pre-activation of layer `i` and `h(i)` its output; `h(L)` holds the softmax
/// probabilities.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pre_activations: Vec<Matrix>,
    activations: Vec<Matrix>,
}

impl ForwardCache {
    /// Number of weight layers `L`.
    pub fn depth(&self) -> usize {
        self.pre_activations.len()
    }

    /// Pre-activation `a_i`, for `1 <= i <= L`.
    pub fn a(&self, i: usize) -> &Matrix {
        &self.pre_activations[i - 1]
    }

    /// Post-activation `h_i`, for `0 <= i <= L`.
    pub fn h(&self, i: usize) -> &Matrix {
        &self.activations[i]
    }

    pub fn probabilities(&self) -> &Matrix {
        &self.activations[self.activations.len() - 1]
    }

    pub fn batch_size(&self) -> usize {
        self.activations[0].cols
    }
}

impl Network {
    /// Runs the batch `(input_size, batch)` through every layer and keeps all
    /// intermediates.
    pub fn forward(&self, input: &Matrix) -> Result<ForwardCache> {
        self.check_input(input)?;

        let depth = self.layers.len();
        let mut pre_activations = Vec::with_capacity(depth);
        let mut activations = Vec::with_capacity(depth + 1);
        activations.push(input.clone());

        for (i, layer) in self.layers.iter().enumerate() {
            let a = layer.pre_activation(&activations[i]);
            let h = if i + 1 == depth {
                softmax(&a)
            } else {
                self.activation.activate(&a)
            };
            pre_activations.push(a);
            activations.push(h);
        }

        Ok(ForwardCache { pre_activations, activations })
    }

    /// Softmax class probabilities, one column per sample.
    pub fn predict(&self, input: &Matrix) -> Result<Matrix> {
        Ok(softmax(&self.output_scores(input)?))
    }

    /// Predicted class per sample: the argmax of the output scores. Skips the
    /// softmax since it preserves ordering.
    pub fn predict_classes(&self, input: &Matrix) -> Result<Vec<usize>> {
        Ok(self.output_scores(input)?.argmax_columns())
    }

    /// Pre-softmax scores `a_L` without keeping intermediates.
    pub(crate) fn output_scores(&self, input: &Matrix) -> Result<Matrix> {
        self.check_input(input)?;

        let depth = self.layers.len();
        let mut current = input.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let a = layer.pre_activation(&current);
            current = if i + 1 == depth { a } else { self.activation.activate(&a) };
        }
        Ok(current)
    }

    pub(crate) fn check_input(&self, input: &Matrix) -> Result<()> {
        self.ensure_initialised()?;
        if input.rows != self.input_size() {
            return Err(NnError::ShapeMismatch {
                what: "input batch rows",
                expected: self.input_size(),
                got: input.rows,
            });
        }
        Ok(())
    }
}

/// Column-wise softmax over clipped scores.
///
/// Each column is shifted by its maximum before exponentiating; the result
/// equals `e^a / Σ e^a` but cannot overflow.
pub fn softmax(scores: &Matrix) -> Matrix {
    let clipped = scores.clamp(-SOFTMAX_CLIP, SOFTMAX_CLIP);
    let mut res = Matrix::zeros(clipped.rows, clipped.cols);

    for j in 0..clipped.cols {
        let max = (0..clipped.rows)
            .map(|i| clipped.data[i][j])
            .fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for i in 0..clipped.rows {
            let e = (clipped.data[i][j] - max).exp();
            res.data[i][j] = e;
            total += e;
        }
        for i in 0..clipped.rows {
            res.data[i][j] /= total;
        }
    }

    res
}
