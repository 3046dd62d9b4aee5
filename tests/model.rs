//!
//! test of loading, baking and writing pore models
//!
#[macro_use]
extern crate approx;

use poremodel::mocks::{mock_model_rows, mock_model_text, mock_states};
use poremodel::prelude::*;
use test_case::test_case;

fn load(k: usize) -> PoreModel {
    let a = SymbolAlphabet::dna();
    PoreModel::from_model_str(&mock_model_text(&a, k, "mock", 0.0), &a).unwrap()
}

#[test_case(1 ; "k=1")]
#[test_case(3 ; "k=3")]
#[test_case(5 ; "k=5")]
fn parse_write_parse_is_identity(k: usize) {
    let a = SymbolAlphabet::dna();
    let m = PoreModel::from_model_str(&mock_model_text(&a, k, "rt", 0.125), &a).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rt.model");
    m.to_model_file(&path, None).unwrap();
    let n = PoreModel::from_model_file(&path, &a).unwrap();
    assert_eq!(m, n);
    assert_eq!(n.n_states(), 4usize.pow(k as u32));
}

#[test_case(15, false ; "15 rows")]
#[test_case(16, true ; "16 rows")]
#[test_case(17, false ; "17 rows")]
fn two_mer_table_needs_exactly_16_rows(n_rows: usize, ok: bool) {
    let a = SymbolAlphabet::dna();
    let text = mock_model_rows(&a, 2)
        .into_iter()
        .cycle()
        .take(n_rows)
        .collect::<Vec<_>>()
        .join("\n");
    match PoreModel::from_model_str(&text, &a) {
        Ok(m) => {
            assert!(ok);
            assert_eq!(m.n_states(), 16);
        }
        Err(e) => {
            assert!(!ok);
            assert!(e.is_validation(), "{}", e);
        }
    }
}

#[test]
fn bake_is_idempotent() {
    let mut m = load(4);
    m.set_calibration(CalibrationCoefficients::new(0.95, 3.2, 1.4, 0.0, 1.05, 0.8))
        .unwrap();
    m.bake().unwrap();
    let a: Vec<ScaledKmerState> = m.scaled_states().unwrap().to_vec();
    m.bake().unwrap();
    let b: Vec<ScaledKmerState> = m.scaled_states().unwrap().to_vec();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.level_mean.to_bits(), y.level_mean.to_bits());
        assert_eq!(x.sd_stdv.to_bits(), y.sd_stdv.to_bits());
        assert_eq!(x.sd_log_lambda.to_bits(), y.sd_log_lambda.to_bits());
    }
}

#[test]
fn log_caches_match() {
    let mut m = load(3);
    m.set_calibration(CalibrationCoefficients::new(1.3, -2.0, 0.7, 0.0, 1.1, 2.0))
        .unwrap();
    m.bake().unwrap();
    for rank in 0..m.n_states() {
        let s = m.emission(rank);
        assert_relative_eq!(s.level_log_stdv, s.level_stdv.ln());
        assert_relative_eq!(s.sd_log_lambda, s.sd_lambda.ln());
        let g = m.level_params(rank);
        assert_eq!(g.log_stdv, s.level_log_stdv);
    }
}

#[test]
fn base_sd_lambda_by_moments() {
    let m = load(3);
    for s in m.states() {
        assert_relative_eq!(s.sd_lambda(), s.sd_mean.powi(3) / s.sd_stdv.powi(2));
    }
}

#[test]
fn identity_calibration() {
    let mut m = load(2);
    m.bake().unwrap();
    for (rank, base) in m.states().iter().enumerate() {
        let s = m.emission(rank);
        assert_eq!(s.level_mean, base.level_mean);
        assert_eq!(s.level_stdv, base.level_stdv);
        assert_eq!(s.sd_mean, base.sd_mean);
        assert_abs_diff_eq!(s.sd_stdv, base.sd_stdv, epsilon = 1e-12);
    }
}

#[test]
fn replace_adds_shift_offset_to_current_shift() {
    let a = SymbolAlphabet::dna();
    let mut m = load(2);
    m.set_calibration(CalibrationCoefficients {
        shift: 1.0,
        ..CalibrationCoefficients::identity()
    })
    .unwrap();
    let text = mock_model_text(&a, 2, "retrained", 0.5);
    let retrained = PoreModel::from_model_str(&text, &a).unwrap();
    m.replace_with(&retrained).unwrap();
    assert_abs_diff_eq!(m.calibration().shift, 1.5);
    assert_eq!(retrained.shift_offset(), 0.5);
    assert_eq!(m.shift_offset(), 0.5);
    // the written model carries the offset for provenance
    assert!(m.to_model_string(None).contains("#shift_offset\t0.5\n"));
}

#[test]
fn container_model_can_be_written_and_reloaded() {
    let a = SymbolAlphabet::dna();
    let entries: Vec<String> = a
        .kmers(2)
        .zip(mock_states(&a, 2))
        .map(|(kmer, s)| {
            format!(
                r#"{{"kmer": "{}", "level_mean": {}, "level_stdv": {}, "sd_mean": {}, "sd_stdv": {}}}"#,
                String::from_utf8_lossy(&kmer),
                s.level_mean,
                s.level_stdv,
                s.sd_mean,
                s.sd_stdv
            )
        })
        .collect();
    let json = format!(
        r#"{{"strands": {{"complement": {{
            "model_file": "/opt/chimaera/model/r7.3/complement_pop1.model",
            "calibration": {{"scale": 1.02, "shift": 4.5, "var": 1.1, "drift": 0.0, "scale_sd": 0.97, "var_sd": 1.2}},
            "entries": [{}]
        }}}}}}"#,
        entries.join(",")
    );
    let container = MemoryContainer::from_json_str(&json).unwrap();
    let config = ModelConfig::default();
    let m = PoreModel::from_container(&container, Strand::Complement, &config).unwrap();
    assert_eq!(m.name(), "r7.3_complement_pop1.model");
    assert!(m.is_baked());
    assert_abs_diff_eq!(
        m.emission_of(b"CG").unwrap().level_mean,
        m.state(m.rank_of(b"CG").unwrap()).level_mean * 1.02 + 4.5
    );

    // only the base states are written
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{}.gz", m.name()));
    m.to_model_file(&path, None).unwrap();
    let n = PoreModel::from_model_file(&path, &a).unwrap();
    assert_eq!(n.states(), m.states());
    assert_eq!(n.name(), m.name());
    assert!(!n.is_baked());
}
