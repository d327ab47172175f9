pub mod backward;
pub mod forward;
pub mod init;
pub mod network;
pub mod spec;

pub use backward::{Gradients, LayerGradients};
pub use forward::{softmax, ForwardCache};
pub use init::InitPolicy;
pub use network::Network;
pub use spec::NetworkSpec;
