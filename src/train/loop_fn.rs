use log::{debug, info};

use crate::data::dataset::Dataset;
use crate::error::Result;
use crate::network::forward::softmax;
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;
use crate::train::metrics::{MetricsHistory, MetricsSink, SampleRecord, StepMetrics};
use crate::train::train_config::TrainConfig;

/// Accuracy and loss of a network over a whole dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Fraction of samples whose highest-scoring class equals the label.
    pub accuracy: f64,
    /// Mean cross-entropy plus the L2 penalty.
    pub loss: f64,
}

impl Network {
    /// Scores every sample of `data` in one batch.
    ///
    /// Predicted classes come from the raw output scores, as in
    /// `predict_classes`, so clipping inside the softmax cannot create ties.
    pub fn evaluate(&self, data: &Dataset, l2_reg_param: f64) -> Result<Evaluation> {
        let input = data.to_matrix();
        self.validate_batch(&input, data.labels())?;

        let scores = self.output_scores(&input)?;
        let probabilities = softmax(&scores);
        let correct = scores
            .argmax_columns()
            .iter()
            .zip(data.labels())
            .filter(|(predicted, label)| predicted == label)
            .count();

        Ok(Evaluation {
            accuracy: correct as f64 / data.len() as f64,
            loss: self.loss_from_probabilities(&probabilities, data.labels(), l2_reg_param),
        })
    }
}

/// Runs `config.epochs` passes of minibatch updates over `train`.
///
/// `step` counts optimizer steps from 1 across every epoch. After each step
/// whose number is a multiple of `config.metrics_interval`, the whole
/// training split and the validation split are re-scored and the result goes
/// to `sink` and `history`. An empty `validation` reports `None` for the
/// validation values.
///
/// Returns the number of optimizer steps taken.
#[allow(clippy::too_many_arguments)]
pub fn train_loop<S: MetricsSink + ?Sized>(
    network: &mut Network,
    train: &Dataset,
    validation: &Dataset,
    optimizer: &mut Optimizer,
    config: &TrainConfig,
    sink: &mut S,
    history: &mut MetricsHistory,
    class_names: Option<&[String]>,
) -> Result<usize> {
    let l2 = config.l2_reg_param;
    let batches_per_epoch = train.batch_count(config.batch_size);
    let mut step = 0;

    for epoch in 0..config.epochs {
        let samples = sample_records(train, epoch, config.samples_per_epoch, class_names);
        if !samples.is_empty() {
            sink.record_samples(epoch, &samples);
        }

        let mut last: Option<StepMetrics> = None;
        for (input, labels) in train.batches(config.batch_size) {
            step += 1;
            optimizer.step(network, &input, labels, step)?;

            if step % config.metrics_interval != 0 {
                continue;
            }
            let on_train = network.evaluate(train, l2)?;
            let on_validation = if validation.is_empty() {
                None
            } else {
                Some(network.evaluate(validation, l2)?)
            };
            let metrics = StepMetrics {
                step,
                epoch,
                train_accuracy: on_train.accuracy,
                train_loss: on_train.loss,
                val_accuracy: on_validation.map(|e| e.accuracy),
                val_loss: on_validation.map(|e| e.loss),
            };
            debug!("step {step}: train_loss={:.6}", metrics.train_loss);

            sink.record_step(&metrics);
            history.push(&metrics);
            last = Some(metrics);
        }

        match last {
            Some(m) => info!(
                "epoch {}/{} ({} steps): train_acc={:.4} train_loss={:.4}",
                epoch + 1,
                config.epochs,
                batches_per_epoch,
                m.train_accuracy,
                m.train_loss
            ),
            None => info!("epoch {}/{} ({} steps)", epoch + 1, config.epochs, batches_per_epoch),
        }
    }

    Ok(step)
}

/// `count` consecutive training samples starting at `count * epoch`, wrapping
/// around the end of the set.
fn sample_records(
    train: &Dataset,
    epoch: usize,
    count: usize,
    class_names: Option<&[String]>,
) -> Vec<SampleRecord> {
    let n = train.len();
    if n == 0 {
        return Vec::new();
    }
    let start = count.wrapping_mul(epoch) % n;

    (0..count.min(n))
        .map(|k| {
            let (pixels, label) = train.sample((start + k) % n);
            SampleRecord {
                label,
                caption: class_names.and_then(|names| names.get(label).cloned()),
                pixels: pixels.to_vec(),
                image_shape: train.image_shape(),
            }
        })
        .collect()
}
