//! The output analysis module provides standard statistical tools for
//! checking generated variates.  Independent, identically-distributed (IID)
//! samples are summarized with the `IndependentSample`, and two samples can
//! be compared with the two-sample Kolmogorov-Smirnov statistic.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

/// The independent sample is for independent, identically-distributed (IID)
/// samples, or where treating the data as an IID sample is determined to be
/// reasonable.  Stateful processes such as MAP and MMPP2 produce correlated
/// sequences, for which only the mean is meaningful here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndependentSample<T> {
    points: Vec<T>,
    mean: T,
    variance: T,
}

impl<T: Float> IndependentSample<T> {
    /// This constructor method creates an `IndependentSample` from a set of
    /// points.
    pub fn post(points: Vec<T>) -> Result<IndependentSample<T>, SimulationError> {
        let count = T::from(points.len()).ok_or(SimulationError::FloatConvError)?;
        if points.is_empty() {
            return Err(SimulationError::EmptySample);
        }
        let mean = points.iter().fold(T::zero(), |sum, point| sum + *point) / count;
        let variance = if points.len() > 1 {
            points
                .iter()
                .fold(T::zero(), |sum, point| sum + (*point - mean).powi(2))
                / (count - T::one())
        } else {
            T::zero()
        };
        Ok(IndependentSample {
            points,
            mean,
            variance,
        })
    }

    pub fn points(&self) -> &[T] {
        &self.points
    }

    /// Return the sample mean.
    pub fn point_estimate_mean(&self) -> T {
        self.mean
    }

    /// Return the sample variance.
    pub fn variance(&self) -> T {
        self.variance
    }
}

/// The two-sample Kolmogorov-Smirnov statistic: the largest distance
/// between the empirical distribution functions of the samples.
pub fn ks_statistic<T: Float>(left: &[T], right: &[T]) -> Result<T, SimulationError> {
    if left.is_empty() || right.is_empty() {
        return Err(SimulationError::EmptySample);
    }
    if left.iter().chain(right).any(|point| !point.is_finite()) {
        return Err(SimulationError::NonFiniteSample);
    }
    let sorted = |points: &[T]| {
        let mut points = points.to_vec();
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        points
    };
    let (left, right) = (sorted(left), sorted(right));
    let n = T::from(left.len()).ok_or(SimulationError::FloatConvError)?;
    let m = T::from(right.len()).ok_or(SimulationError::FloatConvError)?;
    let (mut i, mut j) = (0, 0);
    let mut statistic = T::zero();
    while i < left.len() && j < right.len() {
        let point = left[i].min(right[j]);
        while i < left.len() && left[i] <= point {
            i += 1;
        }
        while j < right.len() && right[j] <= point {
            j += 1;
        }
        let left_cdf = T::from(i).ok_or(SimulationError::FloatConvError)? / n;
        let right_cdf = T::from(j).ok_or(SimulationError::FloatConvError)? / m;
        statistic = statistic.max((left_cdf - right_cdf).abs());
    }
    Ok(statistic)
}
