pub mod loop_fn;
pub mod metrics;
pub mod train_config;
pub mod trainer;

pub use loop_fn::{train_loop, Evaluation};
pub use metrics::{
    JsonLinesSink, LogSink, MetricEvent, MetricsHistory, MetricsSink, NullSink, SampleRecord,
    StepMetrics,
};
pub use train_config::TrainConfig;
pub use trainer::Trainer;
