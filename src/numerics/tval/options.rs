use std::fmt;
use serde::{Deserialize, Serialize};
use crate::Float;
use crate::error::{Error, Result};
use crate::numerics::shrinkage::TvNorm;

/// Stopping rule used for both the inner and the outer loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingCriterion {
    /// Inner: `‖U - Up‖/‖Up‖`. Outer: change against the previous outer iterate.
    RelativeChange,
    /// Inner: `‖d‖/‖U‖`. Outer: `‖AU - b‖/‖b‖`.
    OptimalityGap
}

/// Initial guess used when no explicit guess is supplied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    Zero,
    Adjoint
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Final penalty of the data term.
    pub mu: Float,
    /// Final penalty of the TV term.
    pub beta: Float,
    pub mu0: Option<Float>,
    pub beta0: Option<Float>,
    pub tol_inn: Float,
    pub tol: Float,
    /// Memory of the non-monotone reference cost.
    pub gam: Float,
    pub rate_gam: Float,
    /// Sufficient decrease constant.
    pub c: Float,
    /// Back-tracking step reduction.
    pub gamma: Float,
    pub maxit: usize,
    pub maxin: usize,
    pub maxcnt: usize,
    pub rate_ctn: Float,
    pub stopping: StoppingCriterion,
    pub tv_norm: TvNorm,
    pub nonneg: bool,
    pub isreal: bool,
    pub scale_a: bool,
    pub scale_b: bool,
    pub consist_mu: bool,
    pub init: InitPolicy,
    /// Log every `disp` iterations, 0 disables.
    pub disp: usize
}

impl Default for Options {
    fn default() -> Options {
        Options {
            mu: 256.0,
            beta: 32.0,
            mu0: None,
            beta0: None,
            tol_inn: 1e-3,
            tol: 1e-6,
            gam: 0.9995,
            rate_gam: 0.9,
            c: 1e-5,
            gamma: 0.6,
            maxit: 1025,
            maxin: 300,
            maxcnt: 10,
            rate_ctn: 2.0,
            stopping: StoppingCriterion::RelativeChange,
            tv_norm: TvNorm::Anisotropic,
            nonneg: false,
            isreal: false,
            scale_a: true,
            scale_b: true,
            consist_mu: false,
            init: InitPolicy::Adjoint,
            disp: 0
        }
    }
}

impl Options {
    /// Same defaults with the starting penalties set.
    pub fn with_initial_penalties(beta0: Float, mu0: Float) -> Options {
        Options { beta0: Some(beta0), mu0: Some(mu0), ..Options::default() }
    }

    /// Starting penalties `(beta0, mu0)`; both are required.
    pub fn initial_penalties(&self) -> Result<(Float, Float)> {
        let beta0 = self.beta0.ok_or_else(|| Error::Configuration("beta0 is required".to_string()))?;
        let mu0 = self.mu0.ok_or_else(|| Error::Configuration("mu0 is required".to_string()))?;
        if !(beta0 > 0.0) || !(mu0 > 0.0) {
            return Err(Error::Configuration(format!("beta0 and mu0 must be positive, got {} and {}", beta0, mu0)));
        }
        Ok((beta0, mu0))
    }

    pub fn validate(&self) -> Result<()> {
        self.initial_penalties()?;
        if !(self.beta > 0.0) || !(self.mu > 0.0) {
            return Err(Error::Configuration(format!("beta and mu must be positive, got {} and {}", self.beta, self.mu)));
        }
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(Error::Configuration(format!("gamma must lie in (0,1), got {}", self.gamma)));
        }
        if !(self.rate_ctn >= 1.0) {
            return Err(Error::Configuration(format!("rate_ctn must be at least 1, got {}", self.rate_ctn)));
        }
        Ok(())
    }
}

impl fmt::Display for Options {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut display = String::from(format!("mu_{:+e}_beta_{:+e}_tol_{:+e}_tol_inn_{:+e}_maxit_{}", self.mu, self.beta, self.tol, self.tol_inn, self.maxit));
        if let (Some(mu0), Some(beta0)) = (self.mu0, self.beta0) {
            display.push_str(format!("_mu0_{:+e}_beta0_{:+e}", mu0, beta0).as_str());
        }
        match self.stopping {
            StoppingCriterion::RelativeChange => display.push_str("_rel_chg"),
            StoppingCriterion::OptimalityGap => display.push_str("_opt_gap")
        }
        if self.nonneg {
            display.push_str("_nonneg");
        }
        write!(f, "{}", display)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_initial_penalties_is_a_configuration_error() {
        let options = Options::default();
        assert!(matches!(options.validate(), Err(Error::Configuration(_))));
        let options = Options { beta0: Some(1.0), ..Options::default() };
        assert!(matches!(options.initial_penalties(), Err(Error::Configuration(_))));
        assert!(Options::with_initial_penalties(1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "beta0: 4.0\nmu0: 8.0\nstopping: optimality_gap\nnonneg: true\n";
        let options: Options = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.initial_penalties().unwrap(), (4.0, 8.0));
        assert_eq!(options.stopping, StoppingCriterion::OptimalityGap);
        assert!(options.nonneg);
        assert_eq!(options.maxit, Options::default().maxit);
        assert!(options.to_string().ends_with("_opt_gap_nonneg"));
    }
}
