use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Labelled samples: one flat feature vector and one class index each.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    /// `(height, width)` when the features are flattened grayscale images.
    image_shape: Option<(usize, usize)>,
}

impl Dataset {
    /// Checks that every sample has a label and that all feature vectors share one length.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Dataset> {
        if features.len() != labels.len() {
            return Err(NnError::Dataset(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(first) = features.first() {
            let width = first.len();
            if let Some(i) = features.iter().position(|f| f.len() != width) {
                return Err(NnError::Dataset(format!(
                    "sample {i} has {} features, expected {width}",
                    features[i].len()
                )));
            }
        }
        Ok(Dataset { features, labels, image_shape: None })
    }

    pub fn with_image_shape(mut self, height: usize, width: usize) -> Dataset {
        self.image_shape = Some((height, width));
        self
    }

    pub fn image_shape(&self) -> Option<(usize, usize)> {
        self.image_shape
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature count per sample; 0 for an empty dataset.
    pub fn num_features(&self) -> usize {
        self.features.first().map_or(0, |f| f.len())
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn sample(&self, index: usize) -> (&[f64], usize) {
        (&self.features[index], self.labels[index])
    }

    /// A copy with the samples in a random order drawn from `rng`.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Dataset {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        self.select(&indices)
    }

    /// Splits off the first `floor(len * fraction)` samples.
    /// Returns `(held_out, rest)`.
    pub fn split(&self, fraction: f64) -> Result<(Dataset, Dataset)> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(NnError::Configuration(format!(
                "split fraction must lie in [0, 1), got {fraction}"
            )));
        }
        let cut = (self.len() as f64 * fraction) as usize;
        let indices: Vec<usize> = (0..self.len()).collect();
        Ok((self.select(&indices[..cut]), self.select(&indices[cut..])))
    }

    /// All samples as one `(features, len)` column batch.
    pub fn to_matrix(&self) -> Matrix {
        if self.is_empty() {
            return Matrix::zeros(self.num_features(), 0);
        }
        Matrix::from_columns(&self.features)
    }

    /// Consecutive minibatches of at most `batch_size` samples; the last one
    /// holds the remainder.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = (Matrix, &[usize])> + '_ {
        let step = batch_size.max(1);
        (0..self.len()).step_by(step).map(move |start| {
            let end = (start + step).min(self.len());
            (Matrix::from_columns(&self.features[start..end]), &self.labels[start..end])
        })
    }

    /// Number of minibatches `batches(batch_size)` yields.
    pub fn batch_count(&self, batch_size: usize) -> usize {
        self.len().div_ceil(batch_size.max(1))
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            image_shape: self.image_shape,
        }
    }
}
