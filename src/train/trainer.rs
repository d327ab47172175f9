use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::data::dataset::Dataset;
use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::optim::optimizer::Optimizer;
use crate::train::loop_fn::train_loop;
use crate::train::metrics::{MetricsHistory, MetricsSink};
use crate::train::train_config::TrainConfig;

/// Owns a network and the sink its training runs report to.
///
/// Each `train` call is one run: it optionally re-initialises the
/// parameters, shuffles and splits the data once, creates fresh optimizer
/// state and resets the history.
pub struct Trainer<S: MetricsSink> {
    network: Network,
    sink: S,
    history: MetricsHistory,
    class_names: Option<Vec<String>>,
}

impl<S: MetricsSink> Trainer<S> {
    pub fn new(network: Network, sink: S) -> Trainer<S> {
        Trainer {
            network,
            sink,
            history: MetricsHistory::default(),
            class_names: None,
        }
    }

    /// Captions for reported samples, indexed by label.
    pub fn with_class_names(mut self, class_names: Vec<String>) -> Trainer<S> {
        self.class_names = Some(class_names);
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Per-step metrics of the most recent run.
    pub fn history(&self) -> &MetricsHistory {
        &self.history
    }

    pub fn into_parts(self) -> (Network, S) {
        (self.network, self.sink)
    }

    /// Trains on `dataset` as configured.
    ///
    /// With `init_params == false` the current parameters and activation are
    /// kept; a network without parameters then fails with
    /// [`NnError::UninitializedState`] before anything is computed.
    pub fn train(&mut self, dataset: &Dataset, config: &TrainConfig) -> Result<&MetricsHistory> {
        if !config.init_params && !self.network.is_initialised() {
            return Err(NnError::UninitializedState);
        }
        config.validate()?;
        self.check_dataset(dataset, config)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        if config.init_params {
            self.network.activation = config.activation;
            self.network.initialise(config.initialization_type, &mut rng);
        } else if self.network.activation != config.activation {
            warn!(
                "resuming with the network's {} activation; configured {} is ignored",
                self.network.activation, config.activation
            );
        }

        let (validation, train) = dataset.shuffled(&mut rng).split(config.train_test_split)?;
        let mut optimizer = Optimizer::new(config.optimiser, &config.hyperparams());
        self.history.clear();

        info!(
            "training on {} samples ({} held out) for {} epochs: {} optimizer, {} activation, batch {}",
            train.len(),
            validation.len(),
            config.epochs,
            config.optimiser,
            self.network.activation,
            config.batch_size
        );

        let steps = train_loop(
            &mut self.network,
            &train,
            &validation,
            &mut optimizer,
            config,
            &mut self.sink,
            &mut self.history,
            self.class_names.as_deref(),
        )?;

        info!("training finished after {steps} steps");
        Ok(&self.history)
    }

    /// Shape and label checks that must pass before parameters are touched.
    fn check_dataset(&self, dataset: &Dataset, config: &TrainConfig) -> Result<()> {
        let held_out = (dataset.len() as f64 * config.train_test_split) as usize;
        if dataset.len() == held_out {
            return Err(NnError::Dataset(format!(
                "no training samples left from {} after holding out a {} fraction",
                dataset.len(),
                config.train_test_split
            )));
        }
        if dataset.num_features() != self.network.input_size() {
            return Err(NnError::ShapeMismatch {
                what: "features per sample",
                expected: self.network.input_size(),
                got: dataset.num_features(),
            });
        }
        let classes = self.network.output_size();
        match dataset.labels().iter().find(|&&label| label >= classes) {
            Some(&label) => Err(NnError::LabelOutOfRange { label, classes }),
            None => Ok(()),
        }
    }
}
