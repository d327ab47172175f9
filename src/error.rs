use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, NnError>;

/// Everything that can go wrong while building, running or training a network.
#[derive(Debug)]
pub enum NnError {
    /// An option names an unknown variant or carries an invalid value.
    Configuration(String),
    /// The network has no parameters yet and the caller asked not to create them.
    UninitializedState,
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    LabelOutOfRange {
        label: usize,
        classes: usize,
    },
    /// A dataset could not be parsed or is internally inconsistent.
    Dataset(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for NnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NnError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            NnError::UninitializedState => write!(
                f,
                "weights and biases are not initialized, set init_params to true"
            ),
            NnError::ShapeMismatch {
                what,
                expected,
                got,
            } => write!(f, "shape mismatch in {what}: expected {expected}, got {got}"),
            NnError::LabelOutOfRange { label, classes } => write!(
                f,
                "label {label} is out of range for a network with {classes} classes"
            ),
            NnError::Dataset(msg) => write!(f, "dataset error: {msg}"),
            NnError::Io(e) => write!(f, "io error: {e}"),
            NnError::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for NnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NnError::Io(e) => Some(e),
            NnError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NnError {
    fn from(e: std::io::Error) -> Self {
        NnError::Io(e)
    }
}

impl From<serde_json::Error> for NnError {
    fn from(e: serde_json::Error) -> Self {
        NnError::Json(e)
    }
}
