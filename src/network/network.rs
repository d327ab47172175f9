use log::info;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::network::init::InitPolicy;

/// A fully connected classifier: hidden layers share one activation and the
/// output layer feeds a softmax.
///
/// `structure` lists every layer width from input to output. Once
/// initialised, `layers[i]` maps width `structure[i]` to `structure[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    structure: Vec<usize>,
    pub layers: Vec<Layer>,
    pub activation: Activation,
}

impl Network {
    /// A network with no hidden layers and no parameters.
    pub fn new(input_size: usize, output_size: usize) -> Network {
        Network {
            structure: vec![input_size, output_size],
            layers: Vec::new(),
            activation: Activation::default(),
        }
    }

    /// Inserts a hidden layer of `width` just before the output layer.
    ///
    /// Only allowed before the parameters are initialised.
    pub fn add_layer(&mut self, width: usize) -> Result<()> {
        if self.is_initialised() {
            return Err(NnError::Configuration(
                "layers must be added before the parameters are initialised".to_owned(),
            ));
        }
        if width == 0 {
            return Err(NnError::Configuration("layer width must be positive".to_owned()));
        }
        let at = self.structure.len() - 1;
        self.structure.insert(at, width);
        Ok(())
    }

    /// Replaces every weight and bias with fresh draws from `policy`.
    pub fn initialise<R: Rng + ?Sized>(&mut self, policy: InitPolicy, rng: &mut R) {
        self.layers = self.structure
            .windows(2)
            .map(|pair| Layer::new(pair[1], pair[0], policy, rng))
            .collect();
        info!(
            "initialised {} layers {:?} with {} weights",
            self.layers.len(),
            self.structure,
            policy
        );
    }

    pub fn is_initialised(&self) -> bool {
        !self.layers.is_empty()
    }

    pub fn structure(&self) -> &[usize] {
        &self.structure
    }

    pub fn input_size(&self) -> usize {
        self.structure[0]
    }

    pub fn output_size(&self) -> usize {
        self.structure[self.structure.len() - 1]
    }

    /// Sum of squared weight entries over all layers. Biases are not penalised.
    pub fn weight_norm_squared(&self) -> f64 {
        self.layers.iter().map(|l| l.weights.sum_of_squares()).sum()
    }

    pub(crate) fn ensure_initialised(&self) -> Result<()> {
        if self.is_initialised() {
            Ok(())
        } else {
            Err(NnError::UninitializedState)
        }
    }

    /// Serializes the structure, activation and parameters to pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Loads a network previously written by `save_json`, checking that every
    /// layer matches the stored structure.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.validate()?;
        Ok(network)
    }

    fn validate(&self) -> Result<()> {
        if self.structure.len() < 2 {
            return Err(NnError::Configuration(
                "a network needs at least an input and an output layer".to_owned(),
            ));
        }
        if self.layers.is_empty() {
            return Ok(());
        }
        if self.layers.len() != self.structure.len() - 1 {
            return Err(NnError::ShapeMismatch {
                what: "layer count",
                expected: self.structure.len() - 1,
                got: self.layers.len(),
            });
        }
        for (layer, pair) in self.layers.iter().zip(self.structure.windows(2)) {
            if layer.weights.shape() != (pair[1], pair[0]) {
                return Err(NnError::ShapeMismatch {
                    what: "weight matrix",
                    expected: pair[1] * pair[0],
                    got: layer.weights.rows * layer.weights.cols,
                });
            }
            if layer.biases.shape() != (pair[1], 1) {
                return Err(NnError::ShapeMismatch {
                    what: "bias vector",
                    expected: pair[1],
                    got: layer.biases.rows,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn add_layer_inserts_before_output() {
        let mut net = Network::new(784, 10);
        net.add_layer(128).unwrap();
        net.add_layer(64).unwrap();
        assert_eq!(net.structure(), &[784, 128, 64, 10]);
    }

    #[test]
    fn initialised_shapes_follow_structure() {
        for policy in [InitPolicy::Random, InitPolicy::Xavier] {
            let mut net = Network::new(6, 3);
            net.add_layer(5).unwrap();
            net.add_layer(4).unwrap();
            net.initialise(policy, &mut StdRng::seed_from_u64(0));

            assert_eq!(net.layers.len(), net.structure().len() - 1);
            for (i, layer) in net.layers.iter().enumerate() {
                let s = net.structure();
                assert_eq!(layer.weights.shape(), (s[i + 1], s[i]));
                assert_eq!(layer.biases.shape(), (s[i + 1], 1));
            }
        }
    }

    #[test]
    fn layers_cannot_be_added_after_initialisation() {
        let mut net = Network::new(2, 2);
        net.initialise(InitPolicy::Random, &mut StdRng::seed_from_u64(0));
        assert!(matches!(net.add_layer(3), Err(NnError::Configuration(_))));
        assert_eq!(net.layers.len(), 1);
    }

    #[test]
    fn json_round_trip_preserves_parameters() {
        let mut net = Network::new(3, 2);
        net.add_layer(4).unwrap();
        net.activation = Activation::Tanh;
        net.initialise(InitPolicy::Xavier, &mut StdRng::seed_from_u64(11));

        let path = std::env::temp_dir().join(format!("handgrad-net-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        net.save_json(path).unwrap();
        let loaded = Network::load_json(path).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(loaded.structure(), net.structure());
        assert_eq!(loaded.activation, Activation::Tanh);
        for (a, b) in loaded.layers.iter().zip(net.layers.iter()) {
            assert!(a.weights.zip_map(&b.weights, |x, y| x - y).max_abs() < 1e-12);
        }
    }
}
