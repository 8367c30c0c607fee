use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used across the whole crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A shape invariant was violated (e.g. mismatched lengths).
    SizeMismatch {
        /// Human-readable context for the mismatch (e.g. "params", "batch").
        what: &'static str,
        /// Observed value.
        got: usize,
        /// Expected value.
        expected: usize,
    },

    /// A hyperparameter or flag has a value outside its valid domain.
    InvalidConfig(&'static str),

    /// The dataset could not be read from disk.
    Dataset(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "size mismatch for {what}: got {got}, expected {expected}")
            }
            MlErr::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            MlErr::Dataset(msg) => write!(f, "dataset error: {msg}"),
        }
    }
}

impl Error for MlErr {}
