use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::network::init::InitPolicy;
use crate::optim::optimizer::{Hyperparams, OptimizerKind};

/// Options for one `Trainer::train` run.
///
/// # Fields
/// - `epochs`: full passes over the training split
/// - `learning_rate`: step size shared by every optimizer
/// - `batch_size`: samples per minibatch; the last batch holds the remainder
/// - `initialization_type`: weight initialization policy (`random` or `xavier`)
/// - `activation`: hidden-layer nonlinearity
/// - `optimiser`: update rule
/// - `gamma`: momentum decay (momentum, nesterov)
/// - `beta`: squared-gradient decay (rmsprop)
/// - `beta1`, `beta2`: moment decays (adam, nadam)
/// - `epsilon`: denominator guard (rmsprop, adam, nadam)
/// - `l2_reg_param`: L2 penalty strength
/// - `train_test_split`: fraction of the shuffled data held out for validation
/// - `seed`: fixes initialization and shuffling when set
/// - `init_params`: draw fresh parameters; `false` resumes from the current ones
/// - `metrics_interval`: evaluate and report every this many optimizer steps
/// - `samples_per_epoch`: training samples reported at the start of each epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub initialization_type: InitPolicy,
    pub activation: Activation,
    pub optimiser: OptimizerKind,
    pub gamma: f64,
    pub beta: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub l2_reg_param: f64,
    pub train_test_split: f64,
    pub seed: Option<u64>,
    pub init_params: bool,
    pub metrics_interval: usize,
    pub samples_per_epoch: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let hp = Hyperparams::default();
        TrainConfig {
            epochs: 100,
            learning_rate: hp.learning_rate,
            batch_size: 32,
            initialization_type: InitPolicy::Random,
            activation: Activation::Sigmoid,
            optimiser: OptimizerKind::Sgd,
            gamma: hp.gamma,
            beta: hp.beta,
            beta1: hp.beta1,
            beta2: hp.beta2,
            epsilon: hp.epsilon,
            l2_reg_param: hp.l2_reg_param,
            train_test_split: 0.2,
            seed: None,
            init_params: true,
            metrics_interval: 1,
            samples_per_epoch: 20,
        }
    }
}

impl TrainConfig {
    pub fn hyperparams(&self) -> Hyperparams {
        Hyperparams {
            learning_rate: self.learning_rate,
            gamma: self.gamma,
            beta: self.beta,
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            l2_reg_param: self.l2_reg_param,
        }
    }

    /// Rejects option values no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::Configuration("batch_size must be at least 1".to_owned()));
        }
        if self.metrics_interval == 0 {
            return Err(NnError::Configuration("metrics_interval must be at least 1".to_owned()));
        }
        if !(0.0..1.0).contains(&self.train_test_split) {
            return Err(NnError::Configuration(format!(
                "train_test_split must lie in [0, 1), got {}",
                self.train_test_split
            )));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NnError::Configuration(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(NnError::Configuration(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        for (name, decay) in [
            ("gamma", self.gamma),
            ("beta", self.beta),
            ("beta1", self.beta1),
            ("beta2", self.beta2),
        ] {
            if !(0.0..1.0).contains(&decay) {
                return Err(NnError::Configuration(format!(
                    "{name} must lie in [0, 1), got {decay}"
                )));
            }
        }
        if self.l2_reg_param < 0.0 {
            return Err(NnError::Configuration(format!(
                "l2_reg_param must not be negative, got {}",
                self.l2_reg_param
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: TrainConfig = serde_json::from_str(
            r#"{ "epochs": 3, "optimiser": "nadam", "activation": "relu", "seed": 9 }"#,
        ).unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.optimiser, OptimizerKind::Nadam);
        assert_eq!(config.activation, Activation::ReLU);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.initialization_type, InitPolicy::Random);
        assert!(config.init_params);
        assert_eq!(config.hyperparams(), Hyperparams::default());
    }

    #[test]
    fn unknown_names_fail_to_parse() {
        assert!(serde_json::from_str::<TrainConfig>(r#"{ "activation": "swish" }"#).is_err());
        assert!(serde_json::from_str::<TrainConfig>(r#"{ "optimiser": "lbfgs" }"#).is_err());
        assert!(serde_json::from_str::<TrainConfig>(r#"{ "initialization_type": "he" }"#).is_err());
    }

    #[test]
    fn validate_rejects_unusable_values() {
        assert!(TrainConfig::default().validate().is_ok());
        for bad in [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { metrics_interval: 0, ..TrainConfig::default() },
            TrainConfig { train_test_split: 1.0, ..TrainConfig::default() },
            TrainConfig { learning_rate: 0.0, ..TrainConfig::default() },
            TrainConfig { l2_reg_param: -0.1, ..TrainConfig::default() },
            TrainConfig { epsilon: 0.0, ..TrainConfig::default() },
            TrainConfig { epsilon: f64::NAN, ..TrainConfig::default() },
            TrainConfig { gamma: 1.0, ..TrainConfig::default() },
            TrainConfig { beta: -0.1, ..TrainConfig::default() },
            TrainConfig { beta1: 1.0, ..TrainConfig::default() },
            TrainConfig { beta2: 1.5, ..TrainConfig::default() },
        ] {
            assert!(matches!(bad.validate(), Err(NnError::Configuration(_))));
        }
    }
}
