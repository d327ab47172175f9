use std::fs;

use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};

use crate::data::dataset::Dataset;
use crate::data::idx::load_idx_pair;
use crate::error::{NnError, Result};
use crate::network::spec::NetworkSpec;
use crate::train::train_config::TrainConfig;

/// IDX image/label files for the training set and an optional test set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub train_images: String,
    pub train_labels: String,
    pub test_images: Option<String>,
    pub test_labels: Option<String>,
}

impl DatasetPaths {
    pub fn load_train(&self) -> Result<Dataset> {
        load_idx_pair(&self.train_images, &self.train_labels)
    }

    /// `None` unless both test files are named.
    pub fn load_test(&self) -> Result<Option<Dataset>> {
        match (&self.test_images, &self.test_labels) {
            (Some(images), Some(labels)) => Ok(Some(load_idx_pair(images, labels)?)),
            (None, None) => Ok(None),
            _ => Err(NnError::Configuration(
                "test_images and test_labels must be given together".to_owned(),
            )),
        }
    }
}

/// One experiment described in a single JSON file.
///
/// Network and training options sit at the top level next to each other:
///
/// ```json
/// {
///   "input_size": 784, "output_size": 10, "hidden_layers": [128, 64],
///   "epochs": 10, "optimiser": "adam", "learning_rate": 0.001,
///   "dataset": { "train_images": "train-images-idx3-ubyte",
///                "train_labels": "train-labels-idx1-ubyte" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub network: NetworkSpec,
    #[serde(flatten)]
    pub training: TrainConfig,
    #[serde(default)]
    pub dataset: Option<DatasetPaths>,
    #[serde(default)]
    pub class_names: Option<Vec<String>>,
    /// JSON-lines file receiving every metric event.
    #[serde(default)]
    pub metrics_path: Option<String>,
    /// Where the trained parameters are saved.
    #[serde(default)]
    pub model_path: Option<String>,
    /// Keys no other field claimed; any entry here fails loading.
    #[serde(flatten, skip_serializing)]
    unknown: Map<String, Value>,
}

impl RunConfig {
    pub fn from_json_str(text: &str) -> Result<RunConfig> {
        let config: RunConfig = serde_json::from_str(text)
            .map_err(|e| NnError::Configuration(format!("invalid run config: {e}")))?;
        if !config.unknown.is_empty() {
            let keys: Vec<&str> = config.unknown.keys().map(String::as_str).collect();
            return Err(NnError::Configuration(format!(
                "unrecognized run config keys: {}",
                keys.join(", ")
            )));
        }
        config.network.hidden_widths()?;
        config.training.validate()?;
        Ok(config)
    }

    pub fn load_json(path: &str) -> Result<RunConfig> {
        RunConfig::from_json_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::optim::optimizer::OptimizerKind;

    #[test]
    fn parses_flat_experiment_file() {
        let config = RunConfig::from_json_str(
            r#"{
                "input_size": 784,
                "output_size": 10,
                "hidden_layers": [64, 32, 0],
                "epochs": 5,
                "optimiser": "rmsprop",
                "activation": "tanh",
                "class_names": ["a", "b"],
                "dataset": { "train_images": "x", "train_labels": "y" }
            }"#,
        ).unwrap();

        assert_eq!(config.network.hidden_widths().unwrap(), vec![64, 32]);
        assert_eq!(config.training.epochs, 5);
        assert_eq!(config.training.optimiser, OptimizerKind::RmsProp);
        assert_eq!(config.training.activation, Activation::Tanh);
        assert_eq!(config.training.batch_size, 32);
        assert_eq!(config.class_names.as_deref().map(|c| c.len()), Some(2));
        let paths = config.dataset.unwrap();
        assert_eq!(paths.test_images, None);
        assert!(matches!(paths.load_test(), Ok(None)));
    }

    #[test]
    fn bad_options_are_configuration_errors() {
        for text in [
            r#"{ "input_size": 4, "output_size": 2, "activation": "swish" }"#,
            r#"{ "input_size": 4, "output_size": 2, "hidden_layers": [0, 3] }"#,
            r#"{ "input_size": 4, "output_size": 2, "batch_size": 0 }"#,
            r#"{ "output_size": 2 }"#,
            r#"{ "input_size": 4, "output_size": 2, "optimizer": "adam" }"#,
        ] {
            assert!(
                matches!(RunConfig::from_json_str(text), Err(NnError::Configuration(_))),
                "{text}"
            );
        }
    }
}
