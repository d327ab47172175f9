use crate::math::matrix::Matrix;

/// Categorical cross-entropy over softmax columns with integer class labels.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Mean over the batch of `-log(p[true class] + 1e-12)`.
    ///
    /// The offset keeps a zero probability finite; it shifts each sample's
    /// loss by at most about `1e-12` otherwise.
    ///
    /// `probabilities` is `(classes, batch)`; `labels[j]` is the class of column `j`.
    pub fn loss(probabilities: &Matrix, labels: &[usize]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let total: f64 = labels.iter().enumerate()
            .map(|(j, &class)| -(probabilities.data[class][j] + EPS).ln())
            .sum();
        total / labels.len() as f64
    }

    /// Gradient of softmax followed by cross-entropy with respect to the
    /// pre-softmax scores, one column per sample: `p - one_hot(label)`.
    pub fn derivative(probabilities: &Matrix, labels: &[usize]) -> Matrix {
        probabilities.clone() - one_hot(labels, probabilities.rows)
    }
}

/// `(classes, labels.len())` matrix with a single 1 per column.
pub fn one_hot(labels: &[usize], classes: usize) -> Matrix {
    let mut res = Matrix::zeros(classes, labels.len());
    for (j, &class) in labels.iter().enumerate() {
        res.data[class][j] = 1.0;
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_averages_negative_log_likelihood() {
        let probs = Matrix::from_columns(&[vec![0.5, 0.5], vec![0.25, 0.75]]);
        let loss = CrossEntropyLoss::loss(&probs, &[0, 1]);
        let expected = (-(0.5f64).ln() - (0.75f64).ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_probability_stays_finite() {
        let probs = Matrix::from_columns(&[vec![1.0, 0.0]]);
        assert!((CrossEntropyLoss::loss(&probs, &[1]) + 1e-12f64.ln()).abs() < 1e-9);
        assert!(CrossEntropyLoss::loss(&probs, &[0]).abs() < 1e-11);
    }

    #[test]
    fn derivative_subtracts_one_hot() {
        let probs = Matrix::from_columns(&[vec![0.2, 0.8], vec![0.6, 0.4]]);
        let d = CrossEntropyLoss::derivative(&probs, &[1, 0]);
        let expected = Matrix::from_columns(&[vec![0.2, -0.2], vec![-0.4, 0.4]]);
        assert!(d.zip_map(&expected, |a, b| a - b).max_abs() < 1e-12);
    }

    #[test]
    fn one_hot_marks_each_column() {
        let m = one_hot(&[2, 0], 3);
        assert_eq!(m.column(0), vec![0.0, 0.0, 1.0]);
        assert_eq!(m.column(1), vec![1.0, 0.0, 0.0]);
    }
}
