//! Elementary samplers are pure functions of their parameters and one or
//! more uniform draws.  The composite distributions are built from these,
//! and the `Continuous` random variable dispatches to them.  Parameter
//! checks shared across the distribution families also live here.

use std::f64::consts::TAU;

use super::UniformRNG;
use crate::utils::errors::ParameterError;
use crate::utils::TOLERANCE;

/// Upper bound on redraws when a truncated normal variate is non-positive.
pub const MAX_REJECTIONS: usize = 1000;

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if !value.is_finite() {
        Err(ParameterError::NonFinite { name, value })
    } else if value <= 0.0 {
        Err(ParameterError::NonPositive { name, value })
    } else {
        Ok(value)
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::NonFinite { name, value })
    }
}

pub(crate) fn probability(name: &'static str, value: f64) -> Result<f64, ParameterError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ParameterError::ProbabilityOutOfRange { name, value })
    }
}

/// Checks that a probability vector has nonnegative entries summing to one.
pub(crate) fn probability_vector(probabilities: &[f64]) -> Result<(), ParameterError> {
    if let Some((index, value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| **p < 0.0 || p.is_nan())
    {
        return Err(ParameterError::NegativeProbability {
            index,
            value: *value,
        });
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > TOLERANCE {
        return Err(ParameterError::ProbabilitiesNotNormalized { sum });
    }
    Ok(())
}

/// Scans the probabilities cumulatively, in index order, and selects the
/// first index with a nonzero probability whose running sum is at least
/// `u`.  Rounding shortfalls fall back to the last index with nonzero
/// probability.
pub fn select_cumulative<I>(probabilities: I, u: f64) -> usize
where
    I: IntoIterator<Item = f64>,
{
    let mut running = 0.0;
    let mut last_possible = 0;
    for (index, p) in probabilities.into_iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        running += p;
        last_possible = index;
        if running >= u {
            return index;
        }
    }
    last_possible
}

/// Inverse transform exponential variate, for `u` in [0, 1).
pub fn exponential(lambda: f64, u: f64) -> f64 {
    -(1.0 - u).ln() / lambda
}

pub fn uniform(min: f64, max: f64, u: f64) -> f64 {
    min + (max - min) * u
}

/// Inverse transform Weibull variate, for `u` in [0, 1).
pub fn weibull(shape: f64, scale: f64, u: f64) -> f64 {
    scale * (-(1.0 - u).ln()).powf(1.0 / shape)
}

/// Inverse transform Pareto variate (support starting at `scale`), for `u`
/// in [0, 1).
pub fn pareto(scale: f64, shape: f64, u: f64) -> f64 {
    scale / (1.0 - u).powf(1.0 / shape)
}

/// Basic Box-Muller transform, taking `u0` in (0, 1] and `u1` in [0, 1).
pub fn box_muller(u0: f64, u1: f64) -> (f64, f64) {
    let r = (-2.0 * u0.ln()).sqrt();
    let theta = TAU * u1;
    (r * theta.sin(), r * theta.cos())
}

/// Erlang variate as the sum of `shape` exponential phases.
pub fn erlang(shape: u32, lambda: f64, uniform_rng: &mut UniformRNG) -> f64 {
    (0..shape)
        .map(|_| exponential(lambda, uniform_rng.raw()))
        .sum()
}

/// A normal variate redrawn while non-positive, for durations.  The redraw
/// is bounded by `MAX_REJECTIONS`.
pub fn positive_normal(
    mean: f64,
    std_dev: f64,
    uniform_rng: &mut UniformRNG,
) -> Result<f64, ParameterError> {
    for _ in 0..MAX_REJECTIONS {
        let (z, _) = box_muller(uniform_rng.open_closed01(), uniform_rng.raw());
        let variate = mean + std_dev * z;
        if variate > 0.0 {
            return Ok(variate);
        }
    }
    log::warn!(
        "normal(mean={}, std_dev={}) produced no positive variate in {} draws",
        mean,
        std_dev,
        MAX_REJECTIONS
    );
    Err(ParameterError::RejectionLimitExceeded {
        attempts: MAX_REJECTIONS,
    })
}

/// Validates an empirical table of values and their probabilities.
pub fn validate_empirical(values: &[f64], probabilities: &[f64]) -> Result<(), ParameterError> {
    if probabilities.is_empty() {
        return Err(ParameterError::EmptyTable);
    }
    if values.len() != probabilities.len() {
        return Err(ParameterError::LengthMismatch {
            values: values.len(),
            probabilities: probabilities.len(),
        });
    }
    probability_vector(probabilities)
}

/// Tabulated inverse-CDF sample of an empirical table.
pub fn empirical(values: &[f64], probabilities: &[f64], u: f64) -> f64 {
    values[select_cumulative(probabilities.iter().copied(), u)]
}

/// Probability mass of the table at exactly `x`.
pub fn empirical_pdf(values: &[f64], probabilities: &[f64], x: f64) -> f64 {
    values
        .iter()
        .zip(probabilities)
        .filter(|(value, _)| **value == x)
        .map(|(_, p)| p)
        .sum()
}

/// Probability mass of the table at or below `x`, capped at one.
pub fn empirical_cdf(values: &[f64], probabilities: &[f64], x: f64) -> f64 {
    let cumulative: f64 = values
        .iter()
        .zip(probabilities)
        .filter(|(value, _)| **value <= x)
        .map(|(_, p)| p)
        .sum();
    cumulative.min(1.0)
}
