pub mod adam;
pub mod momentum;
pub mod optimizer;
pub mod rmsprop;
pub mod sgd;
pub mod state;

pub use adam::{Adam, Nadam};
pub use momentum::{Momentum, Nesterov};
pub use optimizer::{Hyperparams, Optimizer, OptimizerKind, UpdateRule};
pub use rmsprop::RmsProp;
pub use sgd::Sgd;
pub use state::{LayerState, OptimizerState, Slot};
