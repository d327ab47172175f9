use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::network::network::Network;

/// Architecture of a network before its parameters exist.
///
/// Fields:
/// - `input_size`: features per sample
/// - `output_size`: number of classes
/// - `hidden_layers`: hidden widths in order from input to output. A width
///   of `0` marks an unused slot; unused slots may only
///   trail the used ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_size: usize,
    pub output_size: usize,
    #[serde(default)]
    pub hidden_layers: Vec<usize>,
}

impl NetworkSpec {
    /// Hidden widths with trailing unused slots removed.
    pub fn hidden_widths(&self) -> Result<Vec<usize>> {
        let used = self.hidden_layers
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |last| last + 1);
        let widths = &self.hidden_layers[..used];
        if let Some(gap) = widths.iter().position(|&w| w == 0) {
            return Err(NnError::Configuration(format!(
                "hidden layer {} has width 0 but a later hidden layer is set",
                gap + 1
            )));
        }
        Ok(widths.to_vec())
    }

    /// Builds an uninitialised network by appending each hidden layer in turn.
    pub fn build(&self) -> Result<Network> {
        if self.input_size == 0 || self.output_size == 0 {
            return Err(NnError::Configuration(
                "input_size and output_size must be positive".to_owned(),
            ));
        }
        let mut network = Network::new(self.input_size, self.output_size);
        for width in self.hidden_widths()? {
            network.add_layer(width)?;
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(hidden: &[usize]) -> NetworkSpec {
        NetworkSpec { input_size: 784, output_size: 10, hidden_layers: hidden.to_vec() }
    }

    #[test]
    fn builds_structure_in_order() {
        let net = spec(&[128, 64, 32]).build().unwrap();
        assert_eq!(net.structure(), &[784, 128, 64, 32, 10]);
        assert!(!net.is_initialised());
    }

    #[test]
    fn trailing_zero_widths_are_dropped() {
        let net = spec(&[128, 128, 128, 0, 0]).build().unwrap();
        assert_eq!(net.structure(), &[784, 128, 128, 128, 10]);
    }

    #[test]
    fn gap_before_a_used_width_is_rejected() {
        assert!(matches!(
            spec(&[128, 0, 64]).build(),
            Err(NnError::Configuration(_))
        ));
    }

    #[test]
    fn deserializes_without_hidden_layers() {
        let s: NetworkSpec = serde_json::from_str(r#"{"input_size": 4, "output_size": 2}"#).unwrap();
        assert_eq!(s.build().unwrap().structure(), &[4, 2]);
    }
}
