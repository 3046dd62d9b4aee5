//!
//! Input/output of pore models
//!
//! * [`text`]: the tab-separated text model format
//! * [`container`]: models embedded in raw-signal containers
//!
//! Files whose name ends with `.gz` are read and written through gzip.
//!
pub mod container;
pub mod text;

use crate::alphabet::{Alphabet, SymbolAlphabet};
use crate::common::{kmer_to_string, K};
use crate::error::{ModelError, Result, ValidationError};
use crate::model::{n_states_of, KmerState};
use fixedbitset::FixedBitSet;
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// the file has `.gz` extension or not
pub fn is_gzip<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().is_some_and(|ext| ext == "gz")
}

///
/// open a file as a buffered reader, decompressing `.gz`
///
pub fn open_file<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead>> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    if is_gzip(&path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

///
/// create a file and write into it with `f`, compressing `.gz`
///
pub fn write_file<P, F>(path: P, f: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let file = std::fs::File::create(path.as_ref())?;
    if is_gzip(&path) {
        let mut writer = GzEncoder::new(file, Compression::default());
        f(&mut writer)?;
        writer.try_finish()?;
    } else {
        let mut writer = std::io::BufWriter::new(file);
        f(&mut writer)?;
        writer.flush()?;
    }
    Ok(())
}

///
/// Rank-indexed table filled row by row
///
/// The first inserted k-mer fixes k and sizes the table to `A^k`. Filled
/// ranks are tracked in a bitset so that a duplicated k-mer is an error
/// even when the number of rows matches the table size.
///
pub(crate) struct StateTable<'a> {
    alphabet: &'a SymbolAlphabet,
    k: Option<K>,
    states: Vec<KmerState>,
    filled: FixedBitSet,
}

impl<'a> StateTable<'a> {
    pub fn new(alphabet: &'a SymbolAlphabet) -> Self {
        StateTable {
            alphabet,
            k: None,
            states: Vec::new(),
            filled: FixedBitSet::with_capacity(0),
        }
    }
    /// k fixed by the first row
    pub fn k(&self) -> Option<K> {
        self.k
    }
    ///
    /// put the state of the k-mer given at `line` (1-based)
    ///
    pub fn insert(&mut self, line: usize, kmer: &[u8], state: KmerState) -> Result<()> {
        let k = match self.k {
            Some(k) => k,
            None => {
                let k = kmer.len();
                let n = n_states_of(self.alphabet, k).map_err(|e| match e {
                    ModelError::Validation(ValidationError::Malformed { message, .. }) => {
                        ValidationError::Malformed { line, message }.into()
                    }
                    e => e,
                })?;
                self.states = vec![KmerState::default(); n];
                self.filled = FixedBitSet::with_capacity(n);
                self.k = Some(k);
                k
            }
        };
        if kmer.len() != k {
            return Err(ValidationError::KmerLength {
                line,
                expected: k,
                found: kmer.len(),
            }
            .into());
        }
        let rank = self
            .alphabet
            .rank(kmer)
            .ok_or_else(|| ValidationError::InvalidSymbol {
                line,
                kmer: kmer_to_string(&kmer),
            })?;
        if self.filled.contains(rank) {
            return Err(ValidationError::DuplicateKmer {
                line,
                kmer: kmer_to_string(&kmer),
            }
            .into());
        }
        self.filled.insert(rank);
        self.states[rank] = state;
        Ok(())
    }
    ///
    /// `(k, states)` if every rank is filled
    ///
    pub fn finish(self) -> Result<(K, Vec<KmerState>)> {
        let k = self.k.ok_or(ValidationError::Empty)?;
        if let Some(rank) = (0..self.states.len()).find(|&rank| !self.filled.contains(rank)) {
            return Err(ValidationError::MissingKmer {
                kmer: kmer_to_string(&self.alphabet.unrank(rank, k)),
            }
            .into());
        }
        Ok((k, self.states))
    }
}

//
// Tests
//
