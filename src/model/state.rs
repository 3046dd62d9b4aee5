//!
//! Per-k-mer parameters
//!
//! * [`KmerState`]: base parameters read from a model
//! * [`ScaledKmerState`]: parameters after applying per-read calibration
//! * [`GaussianParams`]: level-only view of a scaled state
//!
use approx::AbsDiffEq;
use derive_new::new;

///
/// Base emission parameters of a k-mer
///
/// * `level_mean`, `level_stdv`: gaussian of the expected signal level
/// * `sd_mean`, `sd_stdv`: moments of the within-k-mer signal variability
///
#[derive(Debug, Clone, Copy, PartialEq, Default, new)]
pub struct KmerState {
    pub level_mean: f64,
    pub level_stdv: f64,
    pub sd_mean: f64,
    pub sd_stdv: f64,
}

impl KmerState {
    ///
    /// Inverse-gaussian shape parameter of the variability
    /// by method of moments `sd_mean^3 / sd_stdv^2`
    ///
    pub fn sd_lambda(&self) -> f64 {
        self.sd_mean.powi(3) / self.sd_stdv.powi(2)
    }
    ///
    /// View as a scaled state under the identity calibration
    ///
    pub fn to_unscaled(&self) -> ScaledKmerState {
        let sd_lambda = self.sd_lambda();
        ScaledKmerState {
            level_mean: self.level_mean,
            level_stdv: self.level_stdv,
            level_log_stdv: self.level_stdv.ln(),
            sd_mean: self.sd_mean,
            sd_stdv: self.sd_stdv,
            sd_lambda,
            sd_log_lambda: sd_lambda.ln(),
        }
    }
}

///
/// Emission parameters of a k-mer calibrated for a read
///
/// `level_log_stdv` and `sd_log_lambda` are caches of `ln(level_stdv)` and
/// `ln(sd_lambda)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaledKmerState {
    pub level_mean: f64,
    pub level_stdv: f64,
    pub level_log_stdv: f64,
    pub sd_mean: f64,
    pub sd_stdv: f64,
    pub sd_lambda: f64,
    pub sd_log_lambda: f64,
}

impl ScaledKmerState {
    /// gaussian of the signal level
    pub fn level_params(&self) -> GaussianParams {
        GaussianParams {
            mean: self.level_mean,
            stdv: self.level_stdv,
            log_stdv: self.level_log_stdv,
        }
    }
    ///
    /// First field whose value is not finite, or `sd_lambda <= 0`.
    ///
    pub(crate) fn first_anomaly(&self) -> Option<(&'static str, f64)> {
        let fields = [
            ("level_mean", self.level_mean),
            ("level_stdv", self.level_stdv),
            ("level_log_stdv", self.level_log_stdv),
            ("sd_mean", self.sd_mean),
            ("sd_lambda", self.sd_lambda),
            ("sd_stdv", self.sd_stdv),
            ("sd_log_lambda", self.sd_log_lambda),
        ];
        if let Some(&(field, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value))
        } else if self.sd_lambda <= 0.0 {
            Some(("sd_lambda", self.sd_lambda))
        } else {
            None
        }
    }
}

///
/// Gaussian parameters with cached log of the standard deviation
///
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaussianParams {
    pub mean: f64,
    pub stdv: f64,
    pub log_stdv: f64,
}

impl AbsDiffEq for KmerState {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.level_mean, &other.level_mean, epsilon)
            && f64::abs_diff_eq(&self.level_stdv, &other.level_stdv, epsilon)
            && f64::abs_diff_eq(&self.sd_mean, &other.sd_mean, epsilon)
            && f64::abs_diff_eq(&self.sd_stdv, &other.sd_stdv, epsilon)
    }
}

impl AbsDiffEq for ScaledKmerState {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.level_mean, &other.level_mean, epsilon)
            && f64::abs_diff_eq(&self.level_stdv, &other.level_stdv, epsilon)
            && f64::abs_diff_eq(&self.level_log_stdv, &other.level_log_stdv, epsilon)
            && f64::abs_diff_eq(&self.sd_mean, &other.sd_mean, epsilon)
            && f64::abs_diff_eq(&self.sd_stdv, &other.sd_stdv, epsilon)
            && f64::abs_diff_eq(&self.sd_lambda, &other.sd_lambda, epsilon)
            && f64::abs_diff_eq(&self.sd_log_lambda, &other.sd_log_lambda, epsilon)
    }
}

impl std::fmt::Display for KmerState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.level_mean, self.level_stdv, self.sd_mean, self.sd_stdv
        )
    }
}

impl std::fmt::Display for ScaledKmerState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.level_mean,
            self.level_stdv,
            self.level_log_stdv,
            self.sd_mean,
            self.sd_stdv,
            self.sd_lambda,
            self.sd_log_lambda
        )
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sd_lambda_by_moments() {
        let s = KmerState::new(80.0, 1.5, 2.0, 0.5);
        assert_abs_diff_eq!(s.sd_lambda(), 8.0 / 0.25);
    }

    #[test]
    fn unscaled_view() {
        let s = KmerState::new(80.0, 1.5, 2.0, 0.5);
        let u = s.to_unscaled();
        assert_eq!(u.level_mean, 80.0);
        assert_eq!(u.level_stdv, 1.5);
        assert_eq!(u.sd_mean, 2.0);
        assert_eq!(u.sd_stdv, 0.5);
        assert_abs_diff_eq!(u.level_log_stdv, 1.5f64.ln());
        assert_abs_diff_eq!(u.sd_log_lambda, 32.0f64.ln());
        assert!(u.first_anomaly().is_none());
        let g = u.level_params();
        assert_eq!(g.mean, 80.0);
        assert_eq!(g.log_stdv, u.level_log_stdv);
    }

    #[test]
    fn approx_eq() {
        let s = KmerState::new(80.0, 1.5, 2.0, 0.5);
        let t = KmerState::new(80.0 + 1e-12, 1.5, 2.0, 0.5);
        assert_abs_diff_eq!(s, t, epsilon = 1e-9);
        assert!(!s.abs_diff_eq(&KmerState::new(81.0, 1.5, 2.0, 0.5), 1e-9));
    }

    #[test]
    fn anomaly_detection() {
        let s = KmerState::new(80.0, 1.5, 2.0, 0.0).to_unscaled();
        assert_eq!(s.first_anomaly().map(|(f, _)| f), Some("sd_lambda"));
        let s = KmerState::new(80.0, 0.0, 2.0, 0.5).to_unscaled();
        assert_eq!(s.first_anomaly().map(|(f, _)| f), Some("level_log_stdv"));
    }
}
