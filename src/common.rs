//!
//! Commonly used aliases and constants
//!

/// k-mer length
pub type K = usize;

/// Index of a k-mer in `[0, A^k)` given by an alphabet
pub type Rank = usize;

/// k-mer as a sequence of symbols (ascii bytes)
pub type Kmer = Vec<u8>;

///
/// Largest table `A^k` accepted when a model is loaded
///
/// `4^10` states, i.e. DNA 10-mers.
///
pub const MAX_STATES: usize = 1 << 20;

///
/// Array of valid DNA bases
///
pub const VALID_BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

///
/// DNA bases with 5-methylcytosine `M`
///
pub const METHYL_CPG_BASES: [u8; 5] = [b'A', b'C', b'G', b'M', b'T'];

///
/// Directory prefix that recording software prepends to the model path
/// stored in a raw-signal container.
///
pub const DEFAULT_MODEL_PATH_PREFIX: &str = "/opt/chimaera/model/";

///
/// Comment marker of the text model format
///
pub const COMMENT_MARKER: char = '#';

/// Convert k-mer bytes into &str
/// useful in displaying and error messages
pub fn kmer_to_string<T: AsRef<[u8]>>(kmer: &T) -> String {
    String::from_utf8_lossy(kmer.as_ref()).into_owned()
}
