//!
//! Text model format
//!
//! ```text
//! #model_name	r9.4_450bps.nucleotide.6mer.template
//! #shift_offset	0
//! kmer	level_mean	level_stdv	sd_mean	sd_stdv
//! AAAAAA	54.2	1.1	1.4	0.33
//! AAAAAC	55.9	1.3	1.2	0.31
//! ...
//! ```
//!
//! * `#` lines are headers. `#model_name` and `#shift_offset` are parsed,
//!   the others are ignored.
//! * a line starting with `kmer` is a column header and is ignored.
//! * every other non-blank line is `<kmer> <level_mean> <level_stdv> <sd_mean> <sd_stdv>`
//!   separated by whitespace.
//!
//! The written file lists the k-mers in rank order, which is the
//! lexicographic order of the alphabet.
//!
use super::{open_file, write_file, StateTable};
use crate::alphabet::SymbolAlphabet;
use crate::common::{kmer_to_string, COMMENT_MARKER};
use crate::error::{Result, ValidationError};
use crate::model::{KmerState, PoreModel};
use log::info;
use std::io::BufRead;
use std::path::Path;

const MODEL_NAME_HEADER: &str = "#model_name";
const SHIFT_OFFSET_HEADER: &str = "#shift_offset";
const COLUMN_HEADER: &str = "kmer";

///
/// Parse a whitespace separated float of a data line
///
fn parse_field<'a, I: Iterator<Item = &'a str>>(
    iter: &mut I,
    line: usize,
    field: &str,
) -> Result<f64> {
    let token = iter.next().ok_or_else(|| ValidationError::Malformed {
        line,
        message: format!("missing column `{}`", field),
    })?;
    token.parse().map_err(|_| {
        ValidationError::Malformed {
            line,
            message: format!("`{}` is not a valid {}", token, field),
        }
        .into()
    })
}

impl PoreModel {
    ///
    /// Parse a text model
    ///
    /// The model is unbaked and has the identity calibration.
    ///
    pub fn from_model_reader<R: BufRead>(reader: R, alphabet: &SymbolAlphabet) -> Result<Self> {
        let mut name = String::new();
        let mut shift_offset = 0.0;
        let mut table = StateTable::new(alphabet);

        for (i, bytes) in reader.split(b'\n').enumerate() {
            let line = i + 1;
            let text = String::from_utf8(bytes?).map_err(|_| ValidationError::Malformed {
                line,
                message: "not valid UTF-8".to_owned(),
            })?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with(COMMENT_MARKER) {
                let mut iter = trimmed.split_whitespace();
                match iter.next() {
                    Some(MODEL_NAME_HEADER) => {
                        name = iter.next().unwrap_or("").to_owned();
                    }
                    Some(SHIFT_OFFSET_HEADER) => {
                        shift_offset = parse_field(&mut iter, line, "shift_offset")?;
                        info!("found shift offset of {:.2}", shift_offset);
                    }
                    _ => {} // other comments
                }
                continue;
            }
            if trimmed.starts_with(COLUMN_HEADER) {
                continue;
            }

            let mut iter = trimmed.split_whitespace();
            let kmer = iter.next().unwrap_or("");
            let state = KmerState::new(
                parse_field(&mut iter, line, "level_mean")?,
                parse_field(&mut iter, line, "level_stdv")?,
                parse_field(&mut iter, line, "sd_mean")?,
                parse_field(&mut iter, line, "sd_stdv")?,
            );
            table.insert(line, kmer.as_bytes(), state)?;
        }

        let (k, states) = table.finish()?;
        let model = PoreModel::new(k, alphabet.clone(), states, &name, shift_offset)?;
        info!("loaded {}", model);
        Ok(model)
    }
    ///
    /// parse text model string with [`PoreModel::from_model_reader`]
    ///
    pub fn from_model_str(s: &str, alphabet: &SymbolAlphabet) -> Result<Self> {
        Self::from_model_reader(s.as_bytes(), alphabet)
    }
    ///
    /// parse text model file with [`PoreModel::from_model_reader`]
    ///
    pub fn from_model_file<P: AsRef<Path>>(path: P, alphabet: &SymbolAlphabet) -> Result<Self> {
        let reader = open_file(path)?;
        Self::from_model_reader(reader, alphabet)
    }
    ///
    /// Write the base states as a text model
    ///
    /// `name` overrides the model name written in the header.
    ///
    pub fn to_model_writer<W: std::io::Write + ?Sized>(
        &self,
        writer: &mut W,
        name: Option<&str>,
    ) -> Result<()> {
        writeln!(writer, "{}\t{}", MODEL_NAME_HEADER, name.unwrap_or(self.name()))?;
        writeln!(writer, "{}\t{}", SHIFT_OFFSET_HEADER, self.shift_offset())?;
        for (kmer, state) in self.iter() {
            writeln!(writer, "{}\t{}", kmer_to_string(&kmer), state)?;
        }
        Ok(())
    }
    ///
    /// create text model string with [`PoreModel::to_model_writer`]
    ///
    pub fn to_model_string(&self, name: Option<&str>) -> String {
        let mut writer = Vec::with_capacity(128);
        // writing into Vec<u8> does not fail
        let _ = self.to_model_writer(&mut writer, name);
        String::from_utf8_lossy(&writer).into_owned()
    }
    ///
    /// create text model file with [`PoreModel::to_model_writer`]
    ///
    pub fn to_model_file<P: AsRef<Path>>(&self, path: P, name: Option<&str>) -> Result<()> {
        write_file(path, |writer| self.to_model_writer(writer, name))
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::mocks::{mock_model_rows, mock_model_text, mock_states};
    use test_case::test_case;

    fn dna() -> SymbolAlphabet {
        SymbolAlphabet::dna()
    }

    #[test]
    fn parse_mock_model() {
        let a = dna();
        let text = mock_model_text(&a, 2, "r9_mock", 0.25);
        let m = PoreModel::from_model_str(&text, &a).unwrap();
        assert_eq!(m.k(), 2);
        assert_eq!(m.n_states(), 16);
        assert_eq!(m.name(), "r9_mock");
        assert_eq!(m.shift_offset(), 0.25);
        assert!(!m.is_baked());
        assert_eq!(m.states(), &mock_states(&a, 2)[..]);
    }

    #[test_case(15 ; "one row missing")]
    #[test_case(16 ; "complete")]
    #[test_case(17 ; "one row duplicated")]
    fn row_count(n_rows: usize) {
        let a = dna();
        let rows = mock_model_rows(&a, 2);
        let text: String = rows
            .iter()
            .cycle()
            .take(n_rows)
            .map(|row| format!("{}\n", row))
            .collect();
        let r = PoreModel::from_model_str(&text, &a);
        if n_rows == 16 {
            assert_eq!(r.unwrap().n_states(), 16);
        } else {
            assert!(r.unwrap_err().is_validation());
        }
    }

    #[test]
    fn duplicate_masking_a_missing_row_is_detected() {
        // 16 rows but `TT` is missing and `AA` appears twice
        let a = dna();
        let mut rows = mock_model_rows(&a, 2);
        rows[15] = rows[0].clone();
        let text = rows.join("\n");
        let e = PoreModel::from_model_str(&text, &a).unwrap_err();
        assert_eq!(
            e.as_validation(),
            Some(&ValidationError::DuplicateKmer {
                line: 16,
                kmer: "AA".to_owned()
            })
        );
    }

    #[test]
    fn malformed_lines() {
        let a = dna();
        let e = PoreModel::from_model_str("A\t1.0\t2.0\t3.0\n", &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { line: 1, .. })
        ));
        let e = PoreModel::from_model_str("A\t1.0\tx\t3.0\t4.0\n", &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { line: 1, .. })
        ));
        let e = PoreModel::from_model_str("#shift_offset\tabc\n", &a).unwrap_err();
        assert!(e.is_validation());
        let e = PoreModel::from_model_str("#model_name\tempty\n", &a).unwrap_err();
        assert_eq!(e.as_validation(), Some(&ValidationError::Empty));
        let e = PoreModel::from_model_str("AA\t1\t1\t1\t1\nACG\t1\t1\t1\t1\n", &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::KmerLength { line: 2, .. })
        ));
        let long = format!("{}\t1\t1\t1\t1\n", "A".repeat(30));
        let e = PoreModel::from_model_str(&long, &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { .. })
        ));
        // 20^12 states from a single row
        let protein = SymbolAlphabet::new(b"ACDEFGHIKLMNPQRSTVWY").unwrap();
        let e = PoreModel::from_model_str("#model_name\tp\nAAAAAAAAAAAA\t1\t1\t1\t1\n", &protein)
            .unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { line: 2, .. })
        ));
        // 4^12 states is refused too
        let e = PoreModel::from_model_str("AAAAAAAAAAAA\t1\t1\t1\t1\n", &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn non_utf8_line_is_malformed() {
        let a = dna();
        let bytes: &[u8] = b"#model_name\tx\nA\t1\t1\t1\t1\nC\xff\t1\t1\t1\t1\n";
        let e = PoreModel::from_model_reader(bytes, &a).unwrap_err();
        assert!(matches!(
            e.as_validation(),
            Some(ValidationError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn crlf_line_endings() {
        let a = dna();
        let text = mock_model_rows(&a, 1).join("\r\n");
        let m = PoreModel::from_model_str(&text, &a).unwrap();
        assert_eq!(m.states(), &mock_states(&a, 1)[..]);
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let a = dna();
        let text = "# generated by hand\n\n#model_name\tsmall\nkmer\tlevel_mean\tlevel_stdv\tsd_mean\tsd_stdv\nA\t1\t1\t1\t1\n\nC\t2\t1\t1\t1\nG\t3\t1\t1\t1\nT\t4\t1\t1\t1\textra\n";
        let m = PoreModel::from_model_str(text, &a).unwrap();
        assert_eq!(m.k(), 1);
        assert_eq!(m.name(), "small");
        assert_eq!(m.state(3).level_mean, 4.0);
        assert_eq!(m.shift_offset(), 0.0);
    }

    #[test]
    fn write_in_rank_order() {
        let a = dna();
        let text = "#model_name\tm\n#shift_offset\t0.5\nT\t4\t1\t1\t1\nG\t3\t1\t1\t1\nC\t2\t1\t1\t1\nA\t1\t1\t1\t1\n";
        let m = PoreModel::from_model_str(text, &a).unwrap();
        assert_eq!(
            m.to_model_string(None),
            "#model_name\tm\n#shift_offset\t0.5\nA\t1\t1\t1\t1\nC\t2\t1\t1\t1\nG\t3\t1\t1\t1\nT\t4\t1\t1\t1\n"
        );
        assert!(m
            .to_model_string(Some("renamed"))
            .starts_with("#model_name\trenamed\n"));
    }

    #[test]
    fn round_trip_string() {
        let a = SymbolAlphabet::methyl_cpg();
        let text = mock_model_text(&a, 3, "cpg", -1.5);
        let m = PoreModel::from_model_str(&text, &a).unwrap();
        let written = m.to_model_string(None);
        let n = PoreModel::from_model_str(&written, &a).unwrap();
        assert_eq!(m, n);
        // byte-reproducible
        assert_eq!(written, n.to_model_string(None));
    }

    #[test]
    fn round_trip_file() {
        let a = dna();
        let m = PoreModel::from_model_str(&mock_model_text(&a, 3, "file", 0.0), &a).unwrap();
        let dir = tempfile::tempdir().unwrap();
        for filename in ["m.model", "m.model.gz"] {
            let path = dir.path().join(filename);
            m.to_model_file(&path, None).unwrap();
            let n = PoreModel::from_model_file(&path, &a).unwrap();
            assert_eq!(m, n);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let e = PoreModel::from_model_file(dir.path().join("none.model"), &dna()).unwrap_err();
        assert!(matches!(e, ModelError::Io(_)));
    }
}
