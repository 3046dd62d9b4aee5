//!
//! Pore model: k-mer emission parameters of nanopore signal
//!
//! * load a model from a text file ([`model::PoreModel::from_model_file`])
//!   or from a raw-signal container ([`model::PoreModel::from_container`])
//! * bake the per-read calibration into the states ([`model::PoreModel::bake`])
//! * write the model back as text ([`model::PoreModel::to_model_file`])
//!
pub mod alphabet;
pub mod common;
pub mod config;
pub mod error;
pub mod io;
pub mod mocks;
pub mod model;
pub mod prelude;

#[cfg_attr(test, macro_use)]
extern crate approx;
