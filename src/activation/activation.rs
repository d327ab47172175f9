use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Sigmoid inputs are clipped to ±this before exponentiating.
const SIGMOID_CLIP: f64 = 700.0;
/// Tanh inputs are clipped to ±this; the formula exponentiates 2x.
const TANH_CLIP: f64 = 350.0;

/// Hidden-layer nonlinearity.
///
/// Gradients are expressed in terms of the layer's *output* `h = f(a)`, which
/// is what the forward cache keeps around for the backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
    ReLU,
}

impl Activation {
    /// Element-wise activation of a single pre-activation value.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                let x = x.clamp(-SIGMOID_CLIP, SIGMOID_CLIP);
                1.0 / (1.0 + (-x).exp())
            }
            Activation::Tanh => {
                let x = x.clamp(-TANH_CLIP, TANH_CLIP);
                let e = (-2.0 * x).exp();
                (1.0 - e) / (1.0 + e)
            }
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative written in terms of the activation output `h`.
    ///
    /// ReLU is not differentiable at zero; zero outputs get a zero gradient.
    pub fn derivative(&self, h: f64) -> f64 {
        match self {
            Activation::Sigmoid => h * (1.0 - h),
            Activation::Tanh => 1.0 - h * h,
            Activation::ReLU => if h > 0.0 { 1.0 } else { 0.0 },
        }
    }

    pub fn activate(&self, pre_activation: &Matrix) -> Matrix {
        pre_activation.map(|x| self.function(x))
    }

    pub fn gradient(&self, post_activation: &Matrix) -> Matrix {
        post_activation.map(|h| self.derivative(h))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::ReLU => "relu",
        }
    }
}

impl FromStr for Activation {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::ReLU),
            other => Err(NnError::Configuration(format!("unknown activation \"{other}\""))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies the activation called `name`. Unknown names fail before any
/// entry is computed.
pub fn activate_named(pre_activation: &Matrix, name: &str) -> Result<Matrix> {
    let activation: Activation = name.parse()?;
    Ok(activation.activate(pre_activation))
}

/// Gradient of the activation called `name`, given its outputs.
pub fn activation_gradient_named(post_activation: &Matrix, name: &str) -> Result<Matrix> {
    let activation: Activation = name.parse()?;
    Ok(activation.gradient(post_activation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_saturates_without_overflow() {
        let s = Activation::Sigmoid;
        assert!((s.function(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(s.function(1e6), 1.0);
        assert!(s.function(-1e6) >= 0.0);
        assert!(s.function(-1e6).is_finite());
    }

    #[test]
    fn tanh_matches_std_and_clips() {
        let t = Activation::Tanh;
        for x in [-3.0, -0.5, 0.0, 0.25, 2.0] {
            assert!((t.function(x) - f64::tanh(x)).abs() < 1e-12);
        }
        assert!((t.function(1e4) - 1.0).abs() < 1e-12);
        assert!((t.function(-1e4) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn derivatives_use_outputs() {
        let h = Activation::Sigmoid.function(0.3);
        assert!((Activation::Sigmoid.derivative(h) - h * (1.0 - h)).abs() < 1e-15);
        let h = Activation::Tanh.function(0.3);
        assert!((Activation::Tanh.derivative(h) - (1.0 - h * h)).abs() < 1e-15);
        assert_eq!(Activation::ReLU.derivative(2.5), 1.0);
        assert_eq!(Activation::ReLU.derivative(0.0), 0.0);
    }

    #[test]
    fn relu_clamps_negatives() {
        let m = Matrix::from_data(vec![vec![-1.0, 0.0, 3.0]]);
        let out = Activation::ReLU.activate(&m);
        assert_eq!(out.data, vec![vec![0.0, 0.0, 3.0]]);
        assert_eq!(Activation::ReLU.gradient(&out).data, vec![vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let m = Matrix::zeros(2, 2);
        assert!(matches!(activate_named(&m, "swish"), Err(NnError::Configuration(_))));
        assert!(matches!(
            activation_gradient_named(&m, "swish"),
            Err(NnError::Configuration(_))
        ));
        assert_eq!(activate_named(&m, "relu").unwrap(), m);
    }

    #[test]
    fn names_round_trip() {
        for a in [Activation::Sigmoid, Activation::Tanh, Activation::ReLU] {
            assert_eq!(a.to_string().parse::<Activation>().unwrap(), a);
        }
    }
}
