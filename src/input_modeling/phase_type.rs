use serde::{Deserialize, Serialize};

use super::elementary::{exponential, positive, select_cumulative};
use super::generator::{self, Moments};
use super::linalg::{self, Matrix, Vector};
use super::UniformRNG;
use crate::utils::errors::ParameterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTypeConfig {
    pub alpha: Vec<f64>,
    pub t: Vec<Vec<f64>>,
}

/// A validated Phase-Type parameter: the initial phase distribution alpha
/// and the sub-generator T over the transient phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PhaseTypeConfig", into = "PhaseTypeConfig")]
pub struct PhaseTypeParameter {
    alpha: Vector,
    t: Matrix,
    fundamental: Matrix,
    rates: Vec<f64>,
    hidden: Matrix,
    exit: Vec<f64>,
    moments: Moments,
}

impl PhaseTypeParameter {
    pub fn new(alpha: &[f64], t: &[Vec<f64>]) -> Result<Self, ParameterError> {
        Self::from_matrices(Vector::from_column_slice(alpha), linalg::from_rows("T", t)?)
    }

    pub fn from_matrices(alpha: Vector, t: Matrix) -> Result<Self, ParameterError> {
        generator::validate_phase_type(&alpha, &t)?;
        let fundamental = generator::fundamental_matrix(&t)?;
        let moments = generator::moments(&alpha, &fundamental);
        let rates = generator::exit_rates(&t);
        // Absorption rates complete each row of T to zero
        let absorption = Matrix::from_diagonal(&t.column_sum().map(|sum| (-sum).max(0.0)));
        let (hidden, absorbing) = generator::embedded_matrices(&t, &absorption);
        let exit = absorbing.diagonal().iter().copied().collect();
        log::debug!(
            "derived phase-type of dimension {}: mean={}, variance={}",
            t.nrows(),
            moments.mean,
            moments.variance
        );
        Ok(Self {
            alpha,
            t,
            fundamental,
            rates,
            hidden,
            exit,
            moments,
        })
    }

    pub fn dimension(&self) -> usize {
        self.t.nrows()
    }

    pub fn alpha(&self) -> &Vector {
        &self.alpha
    }

    pub fn t(&self) -> &Matrix {
        &self.t
    }

    pub fn fundamental(&self) -> &Matrix {
        &self.fundamental
    }

    /// Probability of absorption on leaving each phase.
    pub fn exit_probabilities(&self) -> &[f64] {
        &self.exit
    }

    pub fn mean(&self) -> f64 {
        self.moments.mean
    }

    pub fn second_moment(&self) -> f64 {
        self.moments.second_moment
    }

    pub fn variance(&self) -> f64 {
        self.moments.variance
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        let factor = self.mean() / positive("mean", mean)?;
        Self::from_matrices(self.alpha.clone(), &self.t * factor)
    }
}

impl TryFrom<PhaseTypeConfig> for PhaseTypeParameter {
    type Error = ParameterError;

    fn try_from(config: PhaseTypeConfig) -> Result<Self, Self::Error> {
        Self::new(&config.alpha, &config.t)
    }
}

impl From<PhaseTypeParameter> for PhaseTypeConfig {
    fn from(parameter: PhaseTypeParameter) -> Self {
        Self {
            alpha: parameter.alpha.iter().copied().collect(),
            t: linalg::to_rows(&parameter.t),
        }
    }
}

/// Time to absorption, from a fresh initial phase on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseType {
    parameter: PhaseTypeParameter,
}

impl PhaseType {
    pub fn new(parameter: PhaseTypeParameter) -> Self {
        Self { parameter }
    }

    pub fn parameter(&self) -> &PhaseTypeParameter {
        &self.parameter
    }

    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> f64 {
        let parameter = &self.parameter;
        let n = parameter.dimension();
        let mut phase = select_cumulative(parameter.alpha.iter().copied(), uniform_rng.raw());
        let mut elapsed = 0.0;
        loop {
            elapsed += exponential(parameter.rates[phase], uniform_rng.raw());
            let selected = select_cumulative(
                parameter
                    .hidden
                    .row(phase)
                    .iter()
                    .copied()
                    .chain(std::iter::once(parameter.exit[phase])),
                uniform_rng.raw(),
            );
            if selected == n {
                return elapsed;
            }
            phase = selected;
        }
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        Ok(Self::new(self.parameter.with_mean(mean)?))
    }
}
