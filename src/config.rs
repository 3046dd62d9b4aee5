//!
//! Configuration of model loading
//!
//! Built once (e.g. from the command line options) and passed by reference
//! to the loaders.
//!
use crate::alphabet::SymbolAlphabet;
use crate::common::{DEFAULT_MODEL_PATH_PREFIX, VALID_BASES};
use crate::error::ValidationError;

///
/// Config for model loaders
///
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    ///
    /// symbols of the alphabet in rank order
    pub symbols: String,
    ///
    /// prefix stripped from the model path recorded in a raw-signal
    /// container when the model name is derived
    pub model_path_prefix: String,
}

impl ModelConfig {
    pub fn new(symbols: &str, model_path_prefix: &str) -> ModelConfig {
        ModelConfig {
            symbols: symbols.to_owned(),
            model_path_prefix: model_path_prefix.to_owned(),
        }
    }
    /// build the alphabet of `symbols`
    pub fn alphabet(&self) -> Result<SymbolAlphabet, ValidationError> {
        SymbolAlphabet::new(self.symbols.as_bytes())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            symbols: String::from_utf8_lossy(&VALID_BASES).into_owned(),
            model_path_prefix: DEFAULT_MODEL_PATH_PREFIX.to_owned(),
        }
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "symbols: {}", self.symbols)?;
        writeln!(f, "model_path_prefix: {}", self.model_path_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    #[test]
    fn default_config() {
        let c = ModelConfig::default();
        assert_eq!(c.symbols, "ACGT");
        assert_eq!(c.model_path_prefix, "/opt/chimaera/model/");
        assert_eq!(c.alphabet().unwrap().size(), 4);
    }

    #[test]
    fn invalid_symbols() {
        let c = ModelConfig::new("GATC", "/models/");
        assert!(c.alphabet().is_err());
    }
}
