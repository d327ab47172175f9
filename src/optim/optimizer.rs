use log::debug;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::network::backward::Gradients;
use crate::network::network::Network;
use crate::optim::adam::{Adam, Nadam};
use crate::optim::momentum::{Momentum, Nesterov};
use crate::optim::rmsprop::RmsProp;
use crate::optim::sgd::Sgd;
use crate::optim::state::{OptimizerState, Slot};

/// Turns a batch-summed gradient into an in-place parameter update.
pub trait UpdateRule {
    /// Shifts a parameter before the gradient is evaluated. Only Nesterov
    /// momentum looks ahead; every other rule leaves the parameter alone.
    fn lookahead(&self, _param: &mut Matrix, _slot: &Slot) {}

    /// Applies one update. `step_num` is the 1-based step count of the run.
    fn update(&self, param: &mut Matrix, grad: &Matrix, slot: &mut Slot, step_num: usize);
}

/// Which update rule a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Momentum,
    Nesterov,
    RmsProp,
    Adam,
    Nadam,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Momentum => "momentum",
            OptimizerKind::Nesterov => "nesterov",
            OptimizerKind::RmsProp => "rmsprop",
            OptimizerKind::Adam => "adam",
            OptimizerKind::Nadam => "nadam",
        }
    }

    pub fn rule(&self, hp: &Hyperparams) -> Box<dyn UpdateRule> {
        let lr = hp.learning_rate;
        match self {
            OptimizerKind::Sgd => Box::new(Sgd::new(lr)),
            OptimizerKind::Momentum => Box::new(Momentum { learning_rate: lr, gamma: hp.gamma }),
            OptimizerKind::Nesterov => Box::new(Nesterov { learning_rate: lr, gamma: hp.gamma }),
            OptimizerKind::RmsProp => Box::new(RmsProp {
                learning_rate: lr,
                beta: hp.beta,
                epsilon: hp.epsilon,
            }),
            OptimizerKind::Adam => Box::new(Adam {
                learning_rate: lr,
                beta1: hp.beta1,
                beta2: hp.beta2,
                epsilon: hp.epsilon,
            }),
            OptimizerKind::Nadam => Box::new(Nadam {
                learning_rate: lr,
                beta1: hp.beta1,
                beta2: hp.beta2,
                epsilon: hp.epsilon,
            }),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sgd" => Ok(OptimizerKind::Sgd),
            "momentum" => Ok(OptimizerKind::Momentum),
            "nesterov" => Ok(OptimizerKind::Nesterov),
            "rmsprop" => Ok(OptimizerKind::RmsProp),
            "adam" => Ok(OptimizerKind::Adam),
            "nadam" => Ok(OptimizerKind::Nadam),
            other => Err(NnError::Configuration(format!("unknown optimiser \"{other}\""))),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalars shared by the update rules. Each rule reads only its own subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparams {
    pub learning_rate: f64,
    /// Momentum decay for momentum and nesterov.
    pub gamma: f64,
    /// Squared-gradient decay for rmsprop.
    pub beta: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub l2_reg_param: f64,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            learning_rate: 0.1,
            gamma: 0.1,
            beta: 0.99,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            l2_reg_param: 0.0,
        }
    }
}

/// An update rule plus the buffers it carries across steps.
pub struct Optimizer {
    kind: OptimizerKind,
    rule: Box<dyn UpdateRule>,
    l2_reg_param: f64,
    state: OptimizerState,
}

impl Optimizer {
    pub fn new(kind: OptimizerKind, hp: &Hyperparams) -> Optimizer {
        Optimizer {
            kind,
            rule: kind.rule(hp),
            l2_reg_param: hp.l2_reg_param,
            state: OptimizerState::default(),
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }

    pub fn state(&self) -> &OptimizerState {
        &self.state
    }

    /// Drops every buffer, as at the start of a new run.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// One full training step on a batch: lookahead, backpropagation, update.
    ///
    /// The batch is validated before any parameter moves.
    pub fn step(&mut self, network: &mut Network, input: &Matrix, labels: &[usize], step_num: usize) -> Result<()> {
        check_step(step_num)?;
        network.validate_batch(input, labels)?;

        for (i, layer) in network.layers.iter_mut().enumerate() {
            if let Some(state) = self.state.layer(i) {
                self.rule.lookahead(&mut layer.weights, &state.weights);
                self.rule.lookahead(&mut layer.biases, &state.biases);
            }
        }

        let grads = network.gradients(input, labels, self.l2_reg_param)?;
        self.apply(network, &grads, step_num)
    }

    /// Applies precomputed gradients to every layer.
    pub fn apply(&mut self, network: &mut Network, grads: &Gradients, step_num: usize) -> Result<()> {
        check_step(step_num)?;
        if grads.layers.len() != network.layers.len() {
            return Err(NnError::ShapeMismatch {
                what: "gradient layer count",
                expected: network.layers.len(),
                got: grads.layers.len(),
            });
        }

        for (layer, grad) in network.layers.iter().zip(grads.layers.iter()) {
            if layer.weights.shape() != grad.weights.shape() || layer.biases.shape() != grad.biases.shape() {
                return Err(NnError::ShapeMismatch {
                    what: "layer gradient",
                    expected: layer.weights.rows * layer.weights.cols,
                    got: grad.weights.rows * grad.weights.cols,
                });
            }
        }

        for (i, (layer, grad)) in network.layers.iter_mut().zip(grads.layers.iter()).enumerate() {
            let state = self.state.layer_mut(i);
            self.rule.update(&mut layer.weights, &grad.weights, &mut state.weights, step_num);
            self.rule.update(&mut layer.biases, &grad.biases, &mut state.biases, step_num);
        }

        debug!("{} step {} applied to {} layers", self.kind, step_num, grads.layers.len());
        Ok(())
    }
}

fn check_step(step_num: usize) -> Result<()> {
    if step_num == 0 {
        return Err(NnError::Configuration("step numbers start at 1".to_owned()));
    }
    Ok(())
}
