use std::io::Write;
use std::sync::mpsc;

use log::{info, warn};
use serde::{Serialize, Deserialize};

/// Accuracy and loss recorded after one optimizer step.
///
/// Validation values are `None` when the validation split is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Cumulative optimizer step, starting at 1.
    pub step: usize,
    /// 0-based epoch the step belongs to.
    pub epoch: usize,
    pub train_accuracy: f64,
    pub train_loss: f64,
    pub val_accuracy: Option<f64>,
    pub val_loss: Option<f64>,
}

/// One training sample reported for visual inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub label: usize,
    /// Human-readable class name, when class names were supplied.
    pub caption: Option<String>,
    pub pixels: Vec<f64>,
    /// `(height, width)` when the pixels form an image.
    pub image_shape: Option<(usize, usize)>,
}

/// Everything a trainer reports, as one value for channel transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetricEvent {
    Step(StepMetrics),
    Samples { epoch: usize, samples: Vec<SampleRecord> },
}

/// Receiver of training metrics. The trainer only writes; it never reads
/// anything back.
pub trait MetricsSink {
    fn record_step(&mut self, metrics: &StepMetrics);

    fn record_samples(&mut self, _epoch: usize, _samples: &[SampleRecord]) {}
}

impl<S: MetricsSink + ?Sized> MetricsSink for &mut S {
    fn record_step(&mut self, metrics: &StepMetrics) {
        (**self).record_step(metrics);
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        (**self).record_samples(epoch, samples);
    }
}

impl<S: MetricsSink + ?Sized> MetricsSink for Box<S> {
    fn record_step(&mut self, metrics: &StepMetrics) {
        (**self).record_step(metrics);
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        (**self).record_samples(epoch, samples);
    }
}

/// Fans every record out to each sink in order.
impl MetricsSink for Vec<Box<dyn MetricsSink>> {
    fn record_step(&mut self, metrics: &StepMetrics) {
        for sink in self.iter_mut() {
            sink.record_step(metrics);
        }
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        for sink in self.iter_mut() {
            sink.record_samples(epoch, samples);
        }
    }
}

/// Forwards events to a receiver on another thread. A dropped receiver is
/// not an error; later events are discarded.
impl MetricsSink for mpsc::Sender<MetricEvent> {
    fn record_step(&mut self, metrics: &StepMetrics) {
        let _ = self.send(MetricEvent::Step(metrics.clone()));
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        let _ = self.send(MetricEvent::Samples { epoch, samples: samples.to_vec() });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record_step(&mut self, _metrics: &StepMetrics) {}
}

/// Writes step metrics through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn record_step(&mut self, m: &StepMetrics) {
        match (m.val_accuracy, m.val_loss) {
            (Some(val_acc), Some(val_loss)) => info!(
                "step {} (epoch {}): train_acc={:.4} train_loss={:.4} val_acc={:.4} val_loss={:.4}",
                m.step, m.epoch, m.train_accuracy, m.train_loss, val_acc, val_loss
            ),
            _ => info!(
                "step {} (epoch {}): train_acc={:.4} train_loss={:.4}",
                m.step, m.epoch, m.train_accuracy, m.train_loss
            ),
        }
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        let labels: Vec<String> = samples
            .iter()
            .map(|s| s.caption.clone().unwrap_or_else(|| s.label.to_string()))
            .collect();
        info!("epoch {epoch} samples: {}", labels.join(", "));
    }
}

/// Serializes every event as one JSON object per line.
///
/// Write failures are logged once and the sink goes quiet afterwards.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> JsonLinesSink<W> {
        JsonLinesSink { writer, failed: false }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &MetricEvent) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.writer))
            .and_then(|()| self.writer.flush());
        if let Err(e) = result {
            warn!("metrics output failed, dropping further records: {e}");
            self.failed = true;
        }
    }
}

impl<W: Write> MetricsSink for JsonLinesSink<W> {
    fn record_step(&mut self, metrics: &StepMetrics) {
        self.write_event(&MetricEvent::Step(metrics.clone()));
    }

    fn record_samples(&mut self, epoch: usize, samples: &[SampleRecord]) {
        self.write_event(&MetricEvent::Samples { epoch, samples: samples.to_vec() });
    }
}

/// The four per-step series of the most recent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsHistory {
    pub train_accuracy: Vec<f64>,
    pub train_loss: Vec<f64>,
    pub val_accuracy: Vec<Option<f64>>,
    pub val_loss: Vec<Option<f64>>,
}

impl MetricsHistory {
    pub fn push(&mut self, m: &StepMetrics) {
        self.train_accuracy.push(m.train_accuracy);
        self.train_loss.push(m.train_loss);
        self.val_accuracy.push(m.val_accuracy);
        self.val_loss.push(m.val_loss);
    }

    pub fn clear(&mut self) {
        self.train_accuracy.clear();
        self.train_loss.clear();
        self.val_accuracy.clear();
        self.val_loss.clear();
    }

    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_loss.is_empty()
    }
}
