//!
//! Alphabet of k-mers
//!
//! An alphabet gives the bijection between a k-mer string and its rank in
//! `[0, A^k)` where `A` is the number of symbols.
//! The rank is the base-`A` number whose digits are the symbol codes, with
//! the first symbol of the k-mer as the most significant digit:
//!
//! ```text
//! s = [s[0]=A, s[1]=C, s[2]=G]
//! rank(s) = code(A)*(4^2) + code(C)*(4^1) + code(G)*(4^0)
//! ```
//!
//! so ascending rank order is the lexicographic order of k-mers.
//!
use crate::common::{Kmer, Rank, METHYL_CPG_BASES, VALID_BASES};
use crate::error::ValidationError;

const NO_CODE: u8 = u8::MAX;

///
/// Operations on k-mers over a fixed, ordered symbol set
///
pub trait Alphabet {
    /// symbols in rank order
    fn symbols(&self) -> &[u8];
    /// code (digit) of the symbol or None if it is not in the alphabet
    fn code(&self, symbol: u8) -> Option<usize>;
    /// number of symbols `A`
    fn size(&self) -> usize {
        self.symbols().len()
    }
    /// symbol of the code
    fn symbol(&self, code: usize) -> u8 {
        self.symbols()[code]
    }
    /// the smallest symbol in the alphabet
    fn first_symbol(&self) -> u8 {
        self.symbol(0)
    }
    ///
    /// the number of distinct k-mers `A^k`
    ///
    /// None if it does not fit in usize.
    ///
    fn n_kmers(&self, k: usize) -> Option<usize> {
        self.size().checked_pow(k as u32)
    }
    ///
    /// rank of the k-mer in `[0, A^k)` where `k = kmer.len()`
    ///
    /// None if the k-mer contains a symbol outside the alphabet or the rank
    /// does not fit in usize.
    ///
    fn rank(&self, kmer: &[u8]) -> Option<Rank> {
        let a = self.size();
        kmer.iter().try_fold(0usize, |acc, &symbol| {
            acc.checked_mul(a)?.checked_add(self.code(symbol)?)
        })
    }
    ///
    /// k-mer whose rank is `rank`
    ///
    fn unrank(&self, rank: Rank, k: usize) -> Kmer {
        let a = self.size();
        let mut kmer = vec![self.first_symbol(); k];
        let mut r = rank;
        for i in (0..k).rev() {
            kmer[i] = self.symbol(r % a);
            r /= a;
        }
        kmer
    }
    ///
    /// `AAA..A` (the first symbol repeated k times), whose rank is 0.
    ///
    fn first_kmer(&self, k: usize) -> Kmer {
        vec![self.first_symbol(); k]
    }
    ///
    /// Advance the k-mer to its lexicographic successor in place
    /// `AAC -> AAG`, `AAT -> ACA`
    ///
    /// Returns false when the k-mer was the last one (`TT..T`); it then
    /// wraps around to the first k-mer.
    ///
    fn lexicographic_next(&self, kmer: &mut [u8]) -> bool {
        let last = self.size() - 1;
        for i in (0..kmer.len()).rev() {
            match self.code(kmer[i]) {
                Some(code) if code < last => {
                    kmer[i] = self.symbol(code + 1);
                    return true;
                }
                _ => {
                    kmer[i] = self.first_symbol();
                }
            }
        }
        false
    }
    ///
    /// Iterator over all k-mers in ascending rank order
    ///
    fn kmers(&self, k: usize) -> KmerIter<'_, Self>
    where
        Self: Sized,
    {
        KmerIter {
            alphabet: self,
            current: Some(self.first_kmer(k)),
        }
    }
}

///
/// Iterator of k-mers driven by [`Alphabet::lexicographic_next`]
///
pub struct KmerIter<'a, A: Alphabet> {
    alphabet: &'a A,
    current: Option<Kmer>,
}

impl<'a, A: Alphabet> Iterator for KmerIter<'a, A> {
    type Item = Kmer;
    fn next(&mut self) -> Option<Kmer> {
        let kmer = self.current.take()?;
        let mut succ = kmer.clone();
        if !kmer.is_empty() && self.alphabet.lexicographic_next(&mut succ) {
            self.current = Some(succ);
        }
        Some(kmer)
    }
}

///
/// Alphabet given by an ordered list of ascii symbols
///
/// Lowercase input symbols are accepted and mapped to the uppercase code.
///
#[derive(Clone, PartialEq, Eq)]
pub struct SymbolAlphabet {
    symbols: Vec<u8>,
    codes: [u8; 256],
}

impl SymbolAlphabet {
    ///
    /// Create an alphabet from symbols sorted in strictly ascending order.
    ///
    pub fn new(symbols: &[u8]) -> Result<SymbolAlphabet, ValidationError> {
        if symbols.is_empty() {
            return Err(ValidationError::InvalidAlphabet("no symbols".to_owned()));
        }
        if symbols.len() >= NO_CODE as usize {
            return Err(ValidationError::InvalidAlphabet(
                "too many symbols".to_owned(),
            ));
        }
        if let Some(&s) = symbols.iter().find(|s| !s.is_ascii_graphic()) {
            return Err(ValidationError::InvalidAlphabet(format!(
                "symbol {:?} is not a printable ascii character",
                s as char
            )));
        }
        if !symbols.windows(2).all(|w| w[0] < w[1]) {
            return Err(ValidationError::InvalidAlphabet(format!(
                "symbols `{}` are not in strictly ascending order",
                String::from_utf8_lossy(symbols)
            )));
        }
        let mut codes = [NO_CODE; 256];
        for (code, &symbol) in symbols.iter().enumerate() {
            codes[symbol as usize] = code as u8;
        }
        // lowercase aliases for uppercase symbols
        for (code, &symbol) in symbols.iter().enumerate() {
            let lower = symbol.to_ascii_lowercase();
            if codes[lower as usize] == NO_CODE {
                codes[lower as usize] = code as u8;
            }
        }
        Ok(SymbolAlphabet {
            symbols: symbols.to_vec(),
            codes,
        })
    }
    /// `ACGT`
    pub fn dna() -> SymbolAlphabet {
        SymbolAlphabet::new(&VALID_BASES).expect("ACGT is a valid alphabet")
    }
    /// `ACGMT` (M = 5-methylcytosine)
    pub fn methyl_cpg() -> SymbolAlphabet {
        SymbolAlphabet::new(&METHYL_CPG_BASES).expect("ACGMT is a valid alphabet")
    }
}

impl Alphabet for SymbolAlphabet {
    fn symbols(&self) -> &[u8] {
        &self.symbols
    }
    fn code(&self, symbol: u8) -> Option<usize> {
        match self.codes[symbol as usize] {
            NO_CODE => None,
            code => Some(code as usize),
        }
    }
}

impl Default for SymbolAlphabet {
    fn default() -> Self {
        SymbolAlphabet::dna()
    }
}

impl std::fmt::Debug for SymbolAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SymbolAlphabet({})", self)
    }
}

impl std::fmt::Display for SymbolAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for &s in self.symbols.iter() {
            write!(f, "{}", s as char)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for SymbolAlphabet {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolAlphabet::new(s.as_bytes())
    }
}

//
// Tests
//
