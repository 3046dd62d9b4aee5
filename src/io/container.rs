//!
//! Models embedded in raw-signal containers
//!
//! A raw-signal container records, for each strand of a read, the model
//! used by the basecaller together with the per-read calibration of that
//! model. [`PoreModel::from_container`] turns them into a baked model.
//!
//! [`MemoryContainer`] is an in-memory container that can be loaded from
//! JSON:
//!
//! ```text
//! {
//!   "strands": {
//!     "template": {
//!       "model_file": "/opt/chimaera/model/r7.3_e6_70bps_6mer/template_median68pA.model",
//!       "calibration": {"scale": 1.0, "shift": 0.0, "var": 1.0, "drift": 0.0, "scale_sd": 1.0, "var_sd": 1.0},
//!       "entries": [{"kmer": "AAAAAA", "level_mean": 54.2, "level_stdv": 1.1, "sd_mean": 1.4, "sd_stdv": 0.33}, ...]
//!     }
//!   }
//! }
//! ```
//!
use super::{open_file, StateTable};
use crate::config::ModelConfig;
use crate::error::{ModelError, Result, ValidationError};
use crate::model::{n_states_of, CalibrationCoefficients, KmerState, PoreModel};
use log::info;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

///
/// Strand of a read
///
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum Strand {
    Template,
    Complement,
}

impl Strand {
    /// 0 for template and 1 for complement
    pub fn index(&self) -> usize {
        match self {
            Strand::Template => 0,
            Strand::Complement => 1,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strand::Template => write!(f, "template"),
            Strand::Complement => write!(f, "complement"),
        }
    }
}

impl FromStr for Strand {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "template" | "0" => Ok(Strand::Template),
            "complement" | "1" => Ok(Strand::Complement),
            _ => Err(ModelError::Container(format!("unknown strand `{}`", s))),
        }
    }
}

///
/// A row of the model embedded in a container
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub kmer: String,
    pub level_mean: f64,
    pub level_stdv: f64,
    pub sd_mean: f64,
    pub sd_stdv: f64,
}

impl ModelEntry {
    pub fn new(kmer: &str, state: KmerState) -> ModelEntry {
        ModelEntry {
            kmer: kmer.to_owned(),
            level_mean: state.level_mean,
            level_stdv: state.level_stdv,
            sd_mean: state.sd_mean,
            sd_stdv: state.sd_stdv,
        }
    }
    pub fn state(&self) -> KmerState {
        KmerState::new(self.level_mean, self.level_stdv, self.sd_mean, self.sd_stdv)
    }
}

///
/// Source of the model of a read
///
pub trait SignalContainer {
    /// model rows of the strand
    fn embedded_model(&self, strand: Strand) -> Result<Vec<ModelEntry>>;
    /// calibration of the model to the strand
    fn calibration(&self, strand: Strand) -> Result<CalibrationCoefficients>;
    /// path of the model file the basecaller used for the strand
    fn model_source_path(&self, strand: Strand) -> Result<String>;
}

///
/// Model of a strand stored in [`MemoryContainer`]
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandModel {
    pub model_file: String,
    pub calibration: CalibrationCoefficients,
    pub entries: Vec<ModelEntry>,
}

///
/// In-memory container
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryContainer {
    pub strands: BTreeMap<Strand, StrandModel>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        MemoryContainer::default()
    }
    /// set the model of the strand
    pub fn insert(&mut self, strand: Strand, model: StrandModel) {
        self.strands.insert(strand, model);
    }
    fn strand(&self, strand: Strand) -> Result<&StrandModel> {
        self.strands
            .get(&strand)
            .ok_or_else(|| ModelError::Container(format!("no {} strand in container", strand)))
    }
    ///
    /// parse JSON container
    ///
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| ModelError::Container(e.to_string()))
    }
    ///
    /// parse JSON string with [`MemoryContainer::from_json_reader`]
    ///
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_json_reader(s.as_bytes())
    }
    ///
    /// parse JSON file with [`MemoryContainer::from_json_reader`]
    ///
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = open_file(path)?;
        Self::from_json_reader(reader)
    }
    ///
    /// JSON string of the container
    ///
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Container(e.to_string()))
    }
}

impl SignalContainer for MemoryContainer {
    fn embedded_model(&self, strand: Strand) -> Result<Vec<ModelEntry>> {
        Ok(self.strand(strand)?.entries.clone())
    }
    fn calibration(&self, strand: Strand) -> Result<CalibrationCoefficients> {
        Ok(self.strand(strand)?.calibration)
    }
    fn model_source_path(&self, strand: Strand) -> Result<String> {
        Ok(self.strand(strand)?.model_file.clone())
    }
}

///
/// Model name from the model file path recorded in a container
///
/// The path after `prefix` (or the whole path if it does not contain
/// `prefix`) with every `/` replaced by `_`, so that the name can be used
/// as a file name.
///
/// ```text
/// /opt/chimaera/model/r7.3_e6_70bps_6mer/template_median68pA.model
///   -> r7.3_e6_70bps_6mer_template_median68pA.model
/// ```
///
pub fn model_name_from_path(path: &str, prefix: &str) -> String {
    let name = match path.find(prefix) {
        Some(pos) if !prefix.is_empty() => &path[pos + prefix.len()..],
        _ => path,
    };
    name.replace('/', "_")
}

///
/// Models of many containers grouped by name
///
/// Reads sequenced with the same basecaller model share a model name, so
/// only one model per name is written out.
///
#[derive(Debug)]
pub struct UniqueModels<T> {
    /// first model of each name, in input order
    pub models: Vec<(T, PoreModel)>,
    /// sources whose model equals the kept model of the same name
    pub duplicates: Vec<T>,
    /// sources whose model differs from the kept model of the same name
    pub conflicts: Vec<(T, ModelError)>,
}

///
/// Keep the first model of each name.
///
/// A later model of the same name is a duplicate if it would be written as
/// the same text (k, alphabet, shift offset and base states), and a
/// conflict otherwise. Calibrations are per read and are not compared.
///
pub fn unique_by_name<T>(models: Vec<(T, PoreModel)>) -> UniqueModels<T> {
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut unique = UniqueModels {
        models: Vec::new(),
        duplicates: Vec::new(),
        conflicts: Vec::new(),
    };
    for (source, model) in models {
        match index.get(model.name()) {
            None => {
                index.insert(model.name().to_owned(), unique.models.len());
                unique.models.push((source, model));
            }
            Some(&i) => {
                let kept = &unique.models[i].1;
                if kept.k() == model.k()
                    && kept.alphabet() == model.alphabet()
                    && kept.shift_offset() == model.shift_offset()
                    && kept.states() == model.states()
                {
                    unique.duplicates.push(source);
                } else {
                    let e = ModelError::Container(format!(
                        "model `{}` differs from an earlier model of the same name",
                        model.name()
                    ));
                    unique.conflicts.push((source, e));
                }
            }
        }
    }
    unique
}

impl PoreModel {
    ///
    /// Model of the strand embedded in the container, baked with the
    /// calibration recorded for the strand.
    ///
    /// `shift_offset` is 0 because the model was recorded with the read.
    ///
    pub fn from_container<C: SignalContainer + ?Sized>(
        container: &C,
        strand: Strand,
        config: &ModelConfig,
    ) -> Result<Self> {
        let alphabet = config.alphabet()?;
        let entries = container.embedded_model(strand)?;
        let first = entries.first().ok_or(ValidationError::Empty)?;
        let expected = n_states_of(&alphabet, first.kmer.len())?;
        if entries.len() != expected {
            return Err(ValidationError::EntryCount {
                expected,
                found: entries.len(),
            }
            .into());
        }

        let mut table = StateTable::new(&alphabet);
        for (i, entry) in entries.iter().enumerate() {
            table.insert(i + 1, entry.kmer.as_bytes(), entry.state())?;
        }
        let (k, states) = table.finish()?;

        let calibration = container.calibration(strand)?;
        let path = container.model_source_path(strand)?;
        let name = model_name_from_path(&path, &config.model_path_prefix);

        let model = PoreModel::new_calibrated(k, alphabet, states, &name, 0.0, calibration)?;
        info!("loaded {} from {} strand ({})", model, strand, calibration);
        Ok(model)
    }
}

//
// Tests
//
