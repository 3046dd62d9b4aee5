//!
//! Error types of model loading, baking and writing
//!
//! * [`ValidationError`]: the input is not a well-formed, complete model
//! * [`ModelError`]: every failure surfaced by this crate
//!
use thiserror::Error;

///
/// Malformed or incomplete model
///
/// `line` is 1-based. For models taken from a container it is the 1-based
/// index of the entry.
///
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("model has no k-mer entries")]
    Empty,

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: k-mer length {found} differs from k={expected}")]
    KmerLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: k-mer `{kmer}` has a symbol outside of the alphabet")]
    InvalidSymbol { line: usize, kmer: String },

    #[error("line {line}: k-mer `{kmer}` appears more than once")]
    DuplicateKmer { line: usize, kmer: String },

    #[error("k-mer `{kmer}` is missing")]
    MissingKmer { kmer: String },

    #[error("expected {expected} k-mer entries but found {found}")]
    EntryCount { expected: usize, found: usize },

    #[error("expected {expected} states but {found} were given")]
    StateCount { expected: usize, found: usize },

    #[error("k={found} of replacing model differs from k={expected}")]
    KMismatch { expected: usize, found: usize },

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
}

///
/// Error type of this crate
///
#[derive(Debug, Error)]
pub enum ModelError {
    /// file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// model is malformed or incomplete
    #[error("invalid model: {0}")]
    Validation(#[from] ValidationError),

    /// a derived parameter was not finite (or not positive) after baking
    #[error("numeric anomaly at rank {rank}: {field}={value}")]
    NumericAnomaly {
        rank: usize,
        field: &'static str,
        value: f64,
    },

    /// raw-signal container could not provide the requested data
    #[error("container error: {0}")]
    Container(String),
}

impl ModelError {
    /// true if the error is a [`ValidationError`]
    pub fn is_validation(&self) -> bool {
        matches!(self, ModelError::Validation(_))
    }
    /// true if the error is a [`ModelError::NumericAnomaly`]
    pub fn is_numeric_anomaly(&self) -> bool {
        matches!(self, ModelError::NumericAnomaly { .. })
    }
    /// reference to the inner validation error if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ModelError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, ModelError>;

//
// Tests
//
