use serde::{Deserialize, Serialize};

use super::elementary::{exponential, positive};
use super::generator::{self, Moments};
use super::linalg::{Matrix, Vector};
use super::UniformRNG;
use crate::utils::errors::ParameterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mmpp2Config {
    pub lambda0: f64,
    pub lambda1: f64,
    pub sigma0: f64,
    pub sigma1: f64,
}

/// A two-state Markov-modulated Poisson process.  In phase `i`, arrivals
/// occur at rate `lambda_i` and the phase switches at rate `sigma_i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Mmpp2Config", into = "Mmpp2Config")]
pub struct Mmpp2Parameter {
    lambda: [f64; 2],
    sigma: [f64; 2],
    moments: Moments,
}

impl Mmpp2Parameter {
    /// Without switching (`sigma0 = sigma1 = 0`) the embedded chain is
    /// reducible and the process stays in its initial phase 0, so it is
    /// taken as a Poisson process of rate `lambda0`.
    pub fn new(
        lambda0: f64,
        lambda1: f64,
        sigma0: f64,
        sigma1: f64,
    ) -> Result<Self, ParameterError> {
        let d0 = Matrix::from_row_slice(
            2,
            2,
            &[-(sigma0 + lambda0), sigma0, sigma1, -(sigma1 + lambda1)],
        );
        let d1 = Matrix::from_row_slice(2, 2, &[lambda0, 0.0, 0.0, lambda1]);
        generator::validate_map(&d0, &d1)?;
        let fundamental = generator::fundamental_matrix(&d0)?;
        let stationary = if sigma0 == 0.0 && sigma1 == 0.0 {
            Vector::from_column_slice(&[1.0, 0.0])
        } else {
            generator::stationary_vector(&fundamental, &d1)?
        };
        let moments = generator::moments(&stationary, &fundamental);
        log::debug!(
            "derived MMPP2: mean={}, variance={}",
            moments.mean,
            moments.variance
        );
        Ok(Self {
            lambda: [lambda0, lambda1],
            sigma: [sigma0, sigma1],
            moments,
        })
    }

    /// Arrival rate in `phase`, or `None` for a phase other than 0 or 1.
    pub fn lambda(&self, phase: usize) -> Option<f64> {
        self.lambda.get(phase).copied()
    }

    pub fn sigma(&self, phase: usize) -> Option<f64> {
        self.sigma.get(phase).copied()
    }

    /// Probability that leaving `phase` is a hidden switch to the other
    /// phase rather than an arrival.
    pub fn switch_probability(&self, phase: usize) -> Option<f64> {
        let sigma = self.sigma(phase)?;
        Some(sigma / (sigma + self.lambda(phase)?))
    }

    pub fn mean(&self) -> f64 {
        self.moments.mean
    }

    pub fn variance(&self) -> f64 {
        self.moments.variance
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        let factor = self.mean() / positive("mean", mean)?;
        Self::new(
            self.lambda[0] * factor,
            self.lambda[1] * factor,
            self.sigma[0] * factor,
            self.sigma[1] * factor,
        )
    }
}

impl TryFrom<Mmpp2Config> for Mmpp2Parameter {
    type Error = ParameterError;

    fn try_from(config: Mmpp2Config) -> Result<Self, Self::Error> {
        Self::new(config.lambda0, config.lambda1, config.sigma0, config.sigma1)
    }
}

impl From<Mmpp2Parameter> for Mmpp2Config {
    fn from(parameter: Mmpp2Parameter) -> Self {
        Self {
            lambda0: parameter.lambda[0],
            lambda1: parameter.lambda[1],
            sigma0: parameter.sigma[0],
            sigma1: parameter.sigma[1],
        }
    }
}

/// The MMPP2 sampler keeps its phase across calls, starting in phase 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Mmpp2State")]
pub struct Mmpp2 {
    parameter: Mmpp2Parameter,
    phase: usize,
}

/// Persisted form of `Mmpp2`, checked for a valid phase on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Mmpp2State {
    parameter: Mmpp2Parameter,
    #[serde(default)]
    phase: usize,
}

impl TryFrom<Mmpp2State> for Mmpp2 {
    type Error = ParameterError;

    fn try_from(state: Mmpp2State) -> Result<Self, Self::Error> {
        if state.phase >= 2 {
            return Err(ParameterError::PhaseOutOfRange {
                phase: state.phase,
                dimension: 2,
            });
        }
        Ok(Self {
            parameter: state.parameter,
            phase: state.phase,
        })
    }
}

impl Mmpp2 {
    pub fn new(parameter: Mmpp2Parameter) -> Self {
        Self {
            parameter,
            phase: 0,
        }
    }

    pub fn parameter(&self) -> &Mmpp2Parameter {
        &self.parameter
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// The time until the next arrival.  Arrivals leave the phase
    /// unchanged; hidden switches flip it and extend the elapsed time.
    pub fn random_variate(&mut self, uniform_rng: &mut UniformRNG) -> f64 {
        let mut elapsed = 0.0;
        loop {
            let phase = self.phase;
            let lambda = self.parameter.lambda[phase];
            let sigma = self.parameter.sigma[phase];
            elapsed += exponential(lambda + sigma, uniform_rng.raw());
            if sigma > 0.0 && uniform_rng.raw() <= sigma / (lambda + sigma) {
                self.phase = 1 - phase;
            } else {
                return elapsed;
            }
        }
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        Ok(Self::new(self.parameter.with_mean(mean)?))
    }
}
