use serde::{Deserialize, Serialize};

use super::elementary::{exponential, positive, select_cumulative};
use super::generator;
use super::linalg::{self, Matrix, Vector};
use super::UniformRNG;
use crate::utils::errors::ParameterError;

/// The plain (D0, D1) configuration of a Markovian Arrival Process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub d0: Vec<Vec<f64>>,
    pub d1: Vec<Vec<f64>>,
}

/// A validated Markovian Arrival Process parameter, with its derived
/// statistics.  D0 holds the hidden-transition rates and D1 the observable
/// ones.  Everything is derived once, at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MapConfig", into = "MapConfig")]
pub struct MapParameter {
    d0: Matrix,
    d1: Matrix,
    fundamental: Matrix,
    stationary: Vector,
    rates: Vec<f64>,
    hidden: Matrix,
    observable: Matrix,
    moments: generator::Moments,
}

impl MapParameter {
    pub fn new(d0: &[Vec<f64>], d1: &[Vec<f64>]) -> Result<Self, ParameterError> {
        Self::from_matrices(linalg::from_rows("D0", d0)?, linalg::from_rows("D1", d1)?)
    }

    pub fn from_matrices(d0: Matrix, d1: Matrix) -> Result<Self, ParameterError> {
        generator::validate_map(&d0, &d1)?;
        let fundamental = generator::fundamental_matrix(&d0)?;
        let stationary = generator::stationary_vector(&fundamental, &d1)?;
        let moments = generator::moments(&stationary, &fundamental);
        let rates = generator::exit_rates(&d0);
        let (hidden, observable) = generator::embedded_matrices(&d0, &d1);
        log::debug!(
            "derived MAP of dimension {}: mean={}, variance={}",
            d0.nrows(),
            moments.mean,
            moments.variance
        );
        Ok(Self {
            d0,
            d1,
            fundamental,
            stationary,
            rates,
            hidden,
            observable,
            moments,
        })
    }

    pub fn dimension(&self) -> usize {
        self.d0.nrows()
    }

    pub fn d0(&self) -> &Matrix {
        &self.d0
    }

    pub fn d1(&self) -> &Matrix {
        &self.d1
    }

    pub fn fundamental(&self) -> &Matrix {
        &self.fundamental
    }

    /// Stationary distribution of the phase seen just after an observable
    /// transition.
    pub fn stationary(&self) -> &Vector {
        &self.stationary
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Embedded hidden-to-hidden transition probabilities (P0).
    pub fn hidden_transitions(&self) -> &Matrix {
        &self.hidden
    }

    /// Embedded hidden-to-observable transition probabilities (P1).
    pub fn observable_transitions(&self) -> &Matrix {
        &self.observable
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

    /// Scales every rate so the mean becomes `mean`, leaving the
    /// coefficient of variation unchanged.
    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        let factor = self.mean() / positive("mean", mean)?;
        Self::from_matrices(&self.d0 * factor, &self.d1 * factor)
    }
}

impl TryFrom<MapConfig> for MapParameter {
    type Error = ParameterError;

    fn try_from(config: MapConfig) -> Result<Self, Self::Error> {
        Self::new(&config.d0, &config.d1)
    }
}

impl From<MapParameter> for MapConfig {
    fn from(parameter: MapParameter) -> Self {
        Self {
            d0: linalg::to_rows(&parameter.d0),
            d1: linalg::to_rows(&parameter.d1),
        }
    }
}

/// Runs the embedded chain from `phase` until an observable transition,
/// returning the elapsed time and the phase entered by that transition.
/// Each visited phase contributes one exponential holding time; the next
/// phase is chosen by a cumulative scan across the hidden row, then the
/// observable row.
pub(crate) fn walk_to_observable(
    rates: &[f64],
    hidden: &Matrix,
    observable: &Matrix,
    mut phase: usize,
    uniform_rng: &mut UniformRNG,
) -> (f64, usize) {
    let n = rates.len();
    let mut elapsed = 0.0;
    loop {
        elapsed += exponential(rates[phase], uniform_rng.raw());
        let u = uniform_rng.raw();
        let selected = select_cumulative(
            hidden
                .row(phase)
                .iter()
                .chain(observable.row(phase).iter())
                .copied(),
            u,
        );
        if selected < n {
            phase = selected;
        } else {
            return (elapsed, selected - n);
        }
    }
}

/// The MAP sampler follows a single continuing trajectory of the
/// underlying chain.  Its phase persists across calls, and is drawn from
/// the stationary distribution on the first call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MapState")]
pub struct Map {
    parameter: MapParameter,
    phase: Option<usize>,
}

/// Persisted form of `Map`, checked for a valid phase on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapState {
    parameter: MapParameter,
    #[serde(default)]
    phase: Option<usize>,
}

impl TryFrom<MapState> for Map {
    type Error = ParameterError;

    fn try_from(state: MapState) -> Result<Self, Self::Error> {
        let dimension = state.parameter.dimension();
        match state.phase {
            Some(phase) if phase >= dimension => {
                Err(ParameterError::PhaseOutOfRange { phase, dimension })
            }
            phase => Ok(Self {
                parameter: state.parameter,
                phase,
            }),
        }
    }
}

impl Map {
    pub fn new(parameter: MapParameter) -> Self {
        Self {
            parameter,
            phase: None,
        }
    }

    pub fn parameter(&self) -> &MapParameter {
        &self.parameter
    }

    pub fn phase(&self) -> Option<usize> {
        self.phase
    }

    /// Forget the trajectory; the next call draws a fresh stationary phase.
    pub fn reset(&mut self) {
        self.phase = None;
    }

    /// The time until the next observable transition, advancing the phase.
    pub fn random_variate(&mut self, uniform_rng: &mut UniformRNG) -> f64 {
        let parameter = &self.parameter;
        let start = match self.phase {
            Some(phase) => phase,
            None => select_cumulative(parameter.stationary.iter().copied(), uniform_rng.raw()),
        };
        let (elapsed, phase) = walk_to_observable(
            &parameter.rates,
            &parameter.hidden,
            &parameter.observable,
            start,
            uniform_rng,
        );
        self.phase = Some(phase);
        elapsed
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        Ok(Self::new(self.parameter.with_mean(mean)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn erlang2() -> MapParameter {
        // Renewal Erlang-2 with rate 2 per phase
        MapParameter::new(
            &[vec![-2.0, 2.0], vec![0.0, -2.0]],
            &[vec![0.0, 0.0], vec![2.0, 0.0]],
        )
        .unwrap()
    }

    fn bursty() -> MapParameter {
        MapParameter::new(
            &[vec![-3.0, 1.0], vec![0.5, -1.5]],
            &[vec![1.5, 0.5], vec![0.2, 0.8]],
        )
        .unwrap()
    }

    #[test]
    fn erlang_map_moments() {
        let parameter = erlang2();
        assert!((parameter.mean() - 1.0).abs() < 1e-9);
        assert!((parameter.variance() - 0.5).abs() < 1e-9);
        assert!((parameter.stationary()[0] - 1.0).abs() < 1e-9);
        assert_eq!(parameter.rates(), &[2.0, 2.0]);
    }

    #[test]
    fn invalid_generator_is_rejected() {
        let result = MapParameter::new(
            &[vec![-2.0, 2.000002], vec![1.0, -1.0]],
            &[vec![0.0, 0.0], vec![0.0, 0.0]],
        );
        assert!(matches!(
            result,
            Err(ParameterError::PositiveRowSum { row: 0, .. })
        ));
    }

    #[test]
    fn phase_is_drawn_lazily_and_persists() {
        let mut map = Map::new(bursty());
        let mut uniform_rng = UniformRNG::default();
        assert_eq!(map.phase(), None);
        map.random_variate(&mut uniform_rng);
        assert!(map.phase().unwrap() < 2);
        map.reset();
        assert_eq!(map.phase(), None);
    }

    #[test]
    fn map_samples_match_expectation() {
        let mut map = Map::new(bursty());
        let expected = map.parameter().mean();
        let mut uniform_rng = UniformRNG::default();
        let mean = (0..50000)
            .map(|_| map.random_variate(&mut uniform_rng))
            .sum::<f64>()
            / 50000.0;
        assert!((mean - expected).abs() / expected < 0.03);
    }

    #[test]
    fn erlang_map_samples_match_variance() {
        let mut map = Map::new(erlang2());
        let mut uniform_rng = UniformRNG::default();
        let points: Vec<f64> = (0..50000)
            .map(|_| map.random_variate(&mut uniform_rng))
            .collect();
        let mean = points.iter().sum::<f64>() / 50000.0;
        let variance = points.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 50000.0;
        assert!((variance - 0.5).abs() / 0.5 < 0.05);
    }

    #[test]
    fn rescaling_keeps_coefficient_of_variation() {
        let parameter = bursty();
        let rescaled = parameter.with_mean(10.0).unwrap();
        let cv = parameter.variance().sqrt() / parameter.mean();
        let rescaled_cv = rescaled.variance().sqrt() / rescaled.mean();
        assert!((rescaled.mean() - 10.0).abs() < 1e-9);
        assert!((cv - rescaled_cv).abs() < 1e-9);
    }

    #[test]
    fn parameter_deserializes_through_validation() {
        let parameter: MapParameter = serde_json::from_str(
            r#"{"d0": [[-2.0, 2.0], [0.0, -2.0]], "d1": [[0.0, 0.0], [2.0, 0.0]]}"#,
        )
        .unwrap();
        assert_eq!(parameter.dimension(), 2);
        let invalid = serde_json::from_str::<MapParameter>(
            r#"{"d0": [[1.0, 0.0], [0.0, -2.0]], "d1": [[0.0, 0.0], [2.0, 0.0]]}"#,
        );
        assert!(invalid.is_err());
    }

    #[test]
    fn persisted_phase_must_exist() {
        let config = |phase: &str| {
            format!(
                r#"{{"parameter": {{"d0": [[-3.0, 1.0], [0.5, -1.5]], "d1": [[1.5, 0.5], [0.2, 0.8]]}}, "phase": {}}}"#,
                phase
            )
        };
        let resumed: Map = serde_json::from_str(&config("1")).unwrap();
        assert_eq!(resumed.phase(), Some(1));
        let fresh: Map = serde_json::from_str(&config("null")).unwrap();
        assert_eq!(fresh.phase(), None);
        let error = serde_json::from_str::<Map>(&config("9")).unwrap_err();
        assert!(error.to_string().contains("Phase 9"));
    }
}
