use log::warn;
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// How fresh weights and biases are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitPolicy {
    /// Every entry from U[-0.5, 0.5).
    #[default]
    Random,
    /// Every entry from N(0, 1 / (fan_in + fan_out)); biases use the same spread.
    Xavier,
}

impl InitPolicy {
    /// Draws a `(rows, cols)` block for a layer with the given fan-in/fan-out.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rows: usize,
        cols: usize,
        fan_in: usize,
        fan_out: usize,
        rng: &mut R,
    ) -> Matrix {
        match self {
            InitPolicy::Random => Matrix::uniform(rows, cols, -0.5, 0.5, rng),
            InitPolicy::Xavier => {
                let std_dev = 1.0 / ((fan_in + fan_out) as f64).sqrt();
                Matrix::normal(rows, cols, std_dev, rng)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InitPolicy::Random => "random",
            InitPolicy::Xavier => "xavier",
        }
    }
}

impl FromStr for InitPolicy {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(InitPolicy::Random),
            "xavier" => Ok(InitPolicy::Xavier),
            other => {
                warn!("{other}: unidentified initialization type");
                Err(NnError::Configuration(format!(
                    "unknown initialization type \"{other}\""
                )))
            }
        }
    }
}

impl fmt::Display for InitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn parses_known_policies() {
        assert_eq!("random".parse::<InitPolicy>().unwrap(), InitPolicy::Random);
        assert_eq!("xavier".parse::<InitPolicy>().unwrap(), InitPolicy::Xavier);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(matches!(
            "he".parse::<InitPolicy>(),
            Err(NnError::Configuration(_))
        ));
    }

    #[test]
    fn xavier_spread_uses_both_fans() {
        let mut rng = StdRng::seed_from_u64(5);
        let m = InitPolicy::Xavier.sample(300, 100, 100, 300, &mut rng);
        let n = (300 * 100) as f64;
        let std_dev = (m.sum_of_squares() / n).sqrt();
        assert!((std_dev - 1.0 / 400f64.sqrt()).abs() < 0.002);
    }
}
