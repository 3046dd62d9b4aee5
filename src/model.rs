//!
//! Pore model: k-mer indexed table of emission parameters
//!
//! ## Views
//!
//! * base states [`KmerState`] as read from the model source
//! * scaled states [`ScaledKmerState`] derived from the base states and the
//!   [`CalibrationCoefficients`] by [`PoreModel::bake`]
//!
//! While the model is baked, the scaled states always equal the bake of
//! the current base states and calibration: every operation that changes
//! either of them re-bakes or leaves the model unbaked.
//!
//! ## Construction
//!
//! * text model file: [`PoreModel::from_model_file`]
//! * raw-signal container: [`PoreModel::from_container`]
//!
pub mod bake;
pub mod calibration;
pub mod state;

pub use calibration::CalibrationCoefficients;
pub use state::{GaussianParams, KmerState, ScaledKmerState};

use crate::alphabet::{Alphabet, SymbolAlphabet};
use crate::common::{Kmer, Rank, K, MAX_STATES};
use crate::error::{Result, ValidationError};
use log::{debug, warn};

///
/// Emission model of a pore
///
#[derive(Debug, Clone, PartialEq)]
pub struct PoreModel {
    k: K,
    alphabet: SymbolAlphabet,
    states: Vec<KmerState>,
    /// Some iff baked
    scaled: Option<Vec<ScaledKmerState>>,
    calibration: CalibrationCoefficients,
    name: String,
    shift_offset: f64,
}

//
// constructors
//
impl PoreModel {
    ///
    /// Create an unbaked model with identity calibration.
    ///
    /// `states[rank]` is the state of the k-mer whose rank is `rank`, so
    /// `states.len()` must be `A^k`.
    ///
    pub fn new(
        k: K,
        alphabet: SymbolAlphabet,
        states: Vec<KmerState>,
        name: &str,
        shift_offset: f64,
    ) -> Result<PoreModel> {
        let expected = n_states_of(&alphabet, k)?;
        if states.len() != expected {
            return Err(ValidationError::StateCount {
                expected,
                found: states.len(),
            }
            .into());
        }
        Ok(PoreModel {
            k,
            alphabet,
            states,
            scaled: None,
            calibration: CalibrationCoefficients::identity(),
            name: name.to_owned(),
            shift_offset,
        })
    }
    ///
    /// Create a model with the calibration and bake it.
    ///
    pub fn new_calibrated(
        k: K,
        alphabet: SymbolAlphabet,
        states: Vec<KmerState>,
        name: &str,
        shift_offset: f64,
        calibration: CalibrationCoefficients,
    ) -> Result<PoreModel> {
        let mut model = PoreModel::new(k, alphabet, states, name, shift_offset)?;
        model.calibration = calibration;
        model.bake()?;
        Ok(model)
    }
}

///
/// `A^k` as a validation result
///
/// Tables larger than [`MAX_STATES`] are rejected before allocation.
///
pub(crate) fn n_states_of<A: Alphabet>(alphabet: &A, k: K) -> Result<usize> {
    match alphabet.n_kmers(k) {
        Some(n) if n <= MAX_STATES => Ok(n),
        _ => Err(ValidationError::Malformed {
            line: 0,
            message: format!(
                "k={} with {} symbols exceeds {} states",
                k,
                alphabet.size(),
                MAX_STATES
            ),
        }
        .into()),
    }
}

//
// accessors
//
impl PoreModel {
    /// k-mer length
    pub fn k(&self) -> K {
        self.k
    }
    pub fn alphabet(&self) -> &SymbolAlphabet {
        &self.alphabet
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    ///
    /// Offset that was folded into `shift` when this model replaced the
    /// states of another model. Kept for provenance.
    ///
    pub fn shift_offset(&self) -> f64 {
        self.shift_offset
    }
    pub fn calibration(&self) -> &CalibrationCoefficients {
        &self.calibration
    }
    /// number of states `A^k`
    pub fn n_states(&self) -> usize {
        self.states.len()
    }
    /// base states in rank order
    pub fn states(&self) -> &[KmerState] {
        &self.states
    }
    /// base state of the rank
    pub fn state(&self, rank: Rank) -> &KmerState {
        &self.states[rank]
    }
    pub fn is_baked(&self) -> bool {
        self.scaled.is_some()
    }
    /// scaled states in rank order if baked
    pub fn scaled_states(&self) -> Option<&[ScaledKmerState]> {
        self.scaled.as_deref()
    }
    ///
    /// Emission parameters of the rank
    ///
    /// The scaled state if the model is baked, otherwise the base state
    /// under the identity calibration.
    ///
    /// # Panics
    /// if `rank >= n_states()`
    ///
    pub fn emission(&self, rank: Rank) -> ScaledKmerState {
        match &self.scaled {
            Some(scaled) => scaled[rank],
            None => self.states[rank].to_unscaled(),
        }
    }
    /// gaussian of the signal level of the rank
    pub fn level_params(&self, rank: Rank) -> GaussianParams {
        self.emission(rank).level_params()
    }
    ///
    /// rank of the k-mer, or None if its length is not k or it has a symbol
    /// outside of the alphabet.
    ///
    pub fn rank_of(&self, kmer: &[u8]) -> Option<Rank> {
        if kmer.len() != self.k {
            return None;
        }
        self.alphabet.rank(kmer)
    }
    /// emission parameters of the k-mer
    pub fn emission_of(&self, kmer: &[u8]) -> Option<ScaledKmerState> {
        self.rank_of(kmer).map(|rank| self.emission(rank))
    }
    /// k-mer string of the rank
    pub fn kmer(&self, rank: Rank) -> Kmer {
        self.alphabet.unrank(rank, self.k)
    }
    ///
    /// Iterator over `(kmer, base state)` in rank order
    ///
    pub fn iter(&self) -> impl Iterator<Item = (Kmer, &KmerState)> + '_ {
        self.alphabet.kmers(self.k).zip(self.states.iter())
    }
}

//
// baking and updates
//
impl PoreModel {
    ///
    /// Recompute every scaled state from the base states and the current
    /// calibration.
    ///
    /// If a derived value is not finite the model is left unbaked and
    /// [`crate::error::ModelError::NumericAnomaly`] is returned.
    ///
    pub fn bake(&mut self) -> Result<()> {
        self.scaled = None;
        let scaled = bake::bake_states(&self.states, &self.calibration).map_err(|e| {
            warn!("model `{}` left unbaked: {}", self.name, e);
            e
        })?;
        debug!(
            "baked {} states of model `{}` with {}",
            scaled.len(),
            self.name,
            self.calibration
        );
        self.scaled = Some(scaled);
        Ok(())
    }
    /// drop the scaled states
    pub fn unbake(&mut self) {
        self.scaled = None;
    }
    ///
    /// Set the calibration. Re-bakes if the model was baked.
    ///
    pub fn set_calibration(&mut self, calibration: CalibrationCoefficients) -> Result<()> {
        self.calibration = calibration;
        self.rebake_if_baked()
    }
    ///
    /// Replace the base states by `states` (e.g. a retrained table).
    ///
    /// * `shift_offset` is added to the current `shift` coefficient and
    ///   stored as the model's `shift_offset`.
    /// * re-bakes if the model was baked.
    ///
    /// `states` must have `A^k` entries for the current k; otherwise the
    /// model is left unchanged.
    ///
    pub fn replace(&mut self, states: Vec<KmerState>, shift_offset: f64) -> Result<()> {
        if states.len() != self.states.len() {
            return Err(ValidationError::StateCount {
                expected: self.states.len(),
                found: states.len(),
            }
            .into());
        }
        self.states = states;
        self.shift_offset = shift_offset;
        self.calibration.shift += shift_offset;
        self.rebake_if_baked()
    }
    ///
    /// Replace the base states by those of another model of the same k and
    /// fold its `shift_offset` into the current `shift`.
    ///
    pub fn replace_with(&mut self, other: &PoreModel) -> Result<()> {
        if other.k != self.k {
            return Err(ValidationError::KMismatch {
                expected: self.k,
                found: other.k,
            }
            .into());
        }
        if other.alphabet != self.alphabet {
            return Err(ValidationError::InvalidAlphabet(format!(
                "replacing model uses alphabet {} but this model uses {}",
                other.alphabet, self.alphabet
            ))
            .into());
        }
        self.replace(other.states.clone(), other.shift_offset)
    }
    fn rebake_if_baked(&mut self) -> Result<()> {
        if self.is_baked() {
            self.bake()
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for PoreModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "PoreModel(name={} k={} alphabet={} n_states={} shift_offset={} baked={})",
            self.name,
            self.k,
            self.alphabet,
            self.n_states(),
            self.shift_offset,
            self.is_baked()
        )
    }
}

//
// Tests
//
