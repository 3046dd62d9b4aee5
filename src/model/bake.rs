//!
//! Baking: derive read-specific states from base states and calibration
//!
use super::calibration::CalibrationCoefficients;
use super::state::{KmerState, ScaledKmerState};
use crate::error::{ModelError, Result};

///
/// Apply the calibration to a state
///
/// ```text
/// level_mean' = level_mean * scale + shift
/// level_stdv' = level_stdv * var
/// sd_mean'    = sd_mean * scale_sd
/// sd_lambda'  = sd_lambda * var_sd
/// sd_stdv'    = sqrt(sd_mean'^3 / sd_lambda')
/// ```
///
/// The result can be non-finite for pathological inputs; see [`bake_states`].
///
pub fn scale_state(state: &KmerState, c: &CalibrationCoefficients) -> ScaledKmerState {
    let level_mean = state.level_mean * c.scale + c.shift;
    let level_stdv = state.level_stdv * c.var;
    let sd_mean = state.sd_mean * c.scale_sd;
    let sd_lambda = state.sd_lambda() * c.var_sd;
    let sd_stdv = (sd_mean.powi(3) / sd_lambda).sqrt();
    ScaledKmerState {
        level_mean,
        level_stdv,
        level_log_stdv: level_stdv.ln(),
        sd_mean,
        sd_stdv,
        sd_lambda,
        sd_log_lambda: sd_lambda.ln(),
    }
}

///
/// Scale every state, failing on the first rank with a non-finite derived
/// value or a non-positive `sd_lambda'`.
///
pub fn bake_states(
    states: &[KmerState],
    c: &CalibrationCoefficients,
) -> Result<Vec<ScaledKmerState>> {
    states
        .iter()
        .enumerate()
        .map(|(rank, state)| {
            let scaled = scale_state(state, c);
            match scaled.first_anomaly() {
                Some((field, value)) => Err(ModelError::NumericAnomaly { rank, field, value }),
                None => Ok(scaled),
            }
        })
        .collect()
}

//
// Tests
//
