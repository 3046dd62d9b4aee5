//!
//! globally-available parts
//!
pub use crate::alphabet::{Alphabet, SymbolAlphabet};
pub use crate::common::{Kmer, Rank, K};
pub use crate::config::ModelConfig;
pub use crate::error::{ModelError, Result, ValidationError};
pub use crate::io::container::{
    unique_by_name, MemoryContainer, SignalContainer, Strand, UniqueModels,
};
pub use crate::model::{
    CalibrationCoefficients, GaussianParams, KmerState, PoreModel, ScaledKmerState,
};
