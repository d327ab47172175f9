pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod train;
pub mod config;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::{activate_named, activation_gradient_named, Activation};
pub use layers::dense::Layer;
pub use network::{ForwardCache, Gradients, InitPolicy, Network, NetworkSpec};
pub use optim::{Hyperparams, Optimizer, OptimizerKind};
pub use data::Dataset;
pub use train::{
    Evaluation, JsonLinesSink, LogSink, MetricEvent, MetricsHistory, MetricsSink, NullSink,
    StepMetrics, TrainConfig, Trainer,
};
pub use config::RunConfig;
