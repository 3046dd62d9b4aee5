//!
//! Mock models for tests
//!
use crate::alphabet::{Alphabet, SymbolAlphabet};
use crate::common::kmer_to_string;
use crate::model::KmerState;

///
/// Deterministic states of all k-mers in rank order
///
/// Every value is positive and distinct across ranks.
///
pub fn mock_states<A: Alphabet>(alphabet: &A, k: usize) -> Vec<KmerState> {
    let n = alphabet.n_kmers(k).expect("k is small in mocks");
    (0..n)
        .map(|rank| {
            let r = rank as f64;
            KmerState::new(
                60.0 + 0.75 * r,
                1.0 + (rank % 7) as f64 * 0.125,
                0.8 + (rank % 5) as f64 * 0.0625,
                0.2 + (rank % 3) as f64 * 0.05,
            )
        })
        .collect()
}

///
/// Text model of [`mock_states`]
///
/// ```text
/// #model_name	<name>
/// #shift_offset	<shift_offset>
/// kmer	level_mean	level_stdv	sd_mean	sd_stdv
/// AA	60	1	0.8	0.2
/// ...
/// ```
///
pub fn mock_model_text(alphabet: &SymbolAlphabet, k: usize, name: &str, shift_offset: f64) -> String {
    let mut text = String::new();
    text.push_str(&format!("#model_name\t{}\n", name));
    text.push_str(&format!("#shift_offset\t{}\n", shift_offset));
    text.push_str("kmer\tlevel_mean\tlevel_stdv\tsd_mean\tsd_stdv\n");
    for (kmer, state) in alphabet.kmers(k).zip(mock_states(alphabet, k)) {
        text.push_str(&format!("{}\t{}\n", kmer_to_string(&kmer), state));
    }
    text
}

///
/// Data lines of [`mock_model_text`] without any header
///
pub fn mock_model_rows(alphabet: &SymbolAlphabet, k: usize) -> Vec<String> {
    alphabet
        .kmers(k)
        .zip(mock_states(alphabet, k))
        .map(|(kmer, state)| format!("{}\t{}", kmer_to_string(&kmer), state))
        .collect()
}
