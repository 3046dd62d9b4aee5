//!
//! Per-read calibration coefficients
//!
use serde::{Deserialize, Serialize};

///
/// Affine constants that map the base model onto the signal of a read
///
/// ```text
/// level_mean' = level_mean * scale + shift
/// level_stdv' = level_stdv * var
/// sd_mean'    = sd_mean * scale_sd
/// sd_lambda'  = sd_lambda * var_sd
/// ```
///
/// `drift` is recorded with the other coefficients but is not applied to
/// the states.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCoefficients {
    pub scale: f64,
    pub shift: f64,
    pub var: f64,
    pub drift: f64,
    pub scale_sd: f64,
    pub var_sd: f64,
}

impl CalibrationCoefficients {
    pub fn new(
        scale: f64,
        shift: f64,
        var: f64,
        drift: f64,
        scale_sd: f64,
        var_sd: f64,
    ) -> CalibrationCoefficients {
        CalibrationCoefficients {
            scale,
            shift,
            var,
            drift,
            scale_sd,
            var_sd,
        }
    }
    /// calibration that leaves every state unchanged
    pub fn identity() -> CalibrationCoefficients {
        CalibrationCoefficients::new(1.0, 0.0, 1.0, 0.0, 1.0, 1.0)
    }
    /// is every coefficient finite
    pub fn is_finite(&self) -> bool {
        [
            self.scale,
            self.shift,
            self.var,
            self.drift,
            self.scale_sd,
            self.var_sd,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

impl Default for CalibrationCoefficients {
    fn default() -> Self {
        CalibrationCoefficients::identity()
    }
}

impl std::fmt::Display for CalibrationCoefficients {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "scale={} shift={} var={} drift={} scale_sd={} var_sd={}",
            self.scale, self.shift, self.var, self.drift, self.scale_sd, self.var_sd
        )
    }
}
