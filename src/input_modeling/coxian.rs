use serde::{Deserialize, Serialize};

use super::elementary::{exponential, positive, probability};
use super::UniformRNG;
use crate::utils::errors::ParameterError;

/// A two-phase Coxian distribution.  Phase 0 always runs, at rate
/// `lambda0`; with probability `phi0` the variate ends there, otherwise
/// phase 1 follows at rate `lambda1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coxian {
    pub lambda0: f64,
    pub lambda1: f64,
    pub phi0: f64,
}

impl Coxian {
    pub fn new(lambda0: f64, lambda1: f64, phi0: f64) -> Result<Self, ParameterError> {
        let coxian = Self {
            lambda0,
            lambda1,
            phi0,
        };
        coxian.validate()?;
        Ok(coxian)
    }

    /// Two-moment fit for `cv^2 >= 0.5`: phase 0 carries half the mean and
    /// phase 1 is entered with probability `1 / (2 cv^2)`.
    pub fn from_mean_cv(mean: f64, cv: f64) -> Result<Self, ParameterError> {
        let mean = positive("mean", mean)?;
        let cv2 = positive("coefficient of variation", cv)?.powi(2);
        if cv2 < 0.5 {
            return Err(ParameterError::ProbabilityOutOfRange {
                name: "continuation",
                value: 1.0 / (2.0 * cv2),
            });
        }
        Self::new(2.0 / mean, 1.0 / (mean * cv2), 1.0 - 1.0 / (2.0 * cv2))
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("lambda0", self.lambda0)?;
        positive("lambda1", self.lambda1)?;
        probability("phi0", self.phi0)?;
        Ok(())
    }

    pub fn mean(&self) -> Result<f64, ParameterError> {
        self.validate()?;
        Ok(1.0 / self.lambda0 + (1.0 - self.phi0) / self.lambda1)
    }

    pub fn variance(&self) -> Result<f64, ParameterError> {
        self.validate()?;
        Ok(1.0 / self.lambda0.powi(2) + (1.0 - self.phi0.powi(2)) / self.lambda1.powi(2))
    }

    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, ParameterError> {
        self.validate()?;
        let mut variate = exponential(self.lambda0, uniform_rng.raw());
        if uniform_rng.raw() >= self.phi0 {
            variate += exponential(self.lambda1, uniform_rng.raw());
        }
        Ok(variate)
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        let factor = self.mean()? / positive("mean", mean)?;
        Self::new(self.lambda0 * factor, self.lambda1 * factor, self.phi0)
    }
}
