pub mod activation;

pub use activation::{activate_named, activation_gradient_named, Activation};
