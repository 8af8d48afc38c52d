use serde::{Deserialize, Serialize};

use super::elementary::{exponential, positive, probability};
use super::UniformRNG;
use crate::utils::errors::ParameterError;

/// A two-branch hyperexponential distribution: rate `lambda1` with
/// probability `p`, otherwise rate `lambda2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperExp {
    pub p: f64,
    pub lambda1: f64,
    pub lambda2: f64,
}

impl HyperExp {
    pub fn new(p: f64, lambda1: f64, lambda2: f64) -> Result<Self, ParameterError> {
        let hyper_exp = Self {
            p,
            lambda1,
            lambda2,
        };
        hyper_exp.validate()?;
        Ok(hyper_exp)
    }

    /// Balanced-means fit, for a coefficient of variation of at least one.
    pub fn from_mean_cv(mean: f64, cv: f64) -> Result<Self, ParameterError> {
        let mean = positive("mean", mean)?;
        let cv2 = positive("coefficient of variation", cv)?.powi(2);
        if cv2 < 1.0 {
            return Err(ParameterError::NonPositive {
                name: "squared coefficient of variation minus one",
                value: cv2 - 1.0,
            });
        }
        let p = 0.5 * (1.0 - ((cv2 - 1.0) / (cv2 + 1.0)).sqrt());
        Self::new(p, 2.0 * p / mean, 2.0 * (1.0 - p) / mean)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        probability("p", self.p)?;
        positive("lambda1", self.lambda1)?;
        positive("lambda2", self.lambda2)?;
        Ok(())
    }

    pub fn mean(&self) -> Result<f64, ParameterError> {
        self.validate()?;
        Ok(self.p / self.lambda1 + (1.0 - self.p) / self.lambda2)
    }

    pub fn variance(&self) -> Result<f64, ParameterError> {
        let mean = self.mean()?;
        let second_moment =
            2.0 * (self.p / self.lambda1.powi(2) + (1.0 - self.p) / self.lambda2.powi(2));
        Ok(second_moment - mean.powi(2))
    }

    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, ParameterError> {
        self.validate()?;
        let lambda = if uniform_rng.raw() <= self.p {
            self.lambda1
        } else {
            self.lambda2
        };
        Ok(exponential(lambda, uniform_rng.raw()))
    }

    pub fn with_mean(&self, mean: f64) -> Result<Self, ParameterError> {
        let factor = self.mean()? / positive("mean", mean)?;
        Self::new(self.p, self.lambda1 * factor, self.lambda2 * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extreme_probabilities_reduce_to_exponential() {
        let first = HyperExp::new(1.0, 3.0, 0.5).unwrap();
        let second = HyperExp::new(0.0, 3.0, 0.5).unwrap();
        let mut left = UniformRNG::new(3);
        let mut right = UniformRNG::new(3);
        (0..1000).for_each(|_| {
            right.raw();
            assert_eq!(
                first.random_variate(&mut left).unwrap(),
                exponential(3.0, right.raw())
            );
        });
        (0..1000).for_each(|_| {
            right.raw();
            assert_eq!(
                second.random_variate(&mut left).unwrap(),
                exponential(0.5, right.raw())
            );
        });
    }

    #[test]
    fn moments() {
        let hyper_exp = HyperExp::new(0.25, 2.0, 0.5).unwrap();
        assert!((hyper_exp.mean().unwrap() - (0.125 + 1.5)).abs() < 1e-12);
        let second_moment = 2.0 * (0.25 / 4.0 + 0.75 / 0.25);
        let expected = second_moment - (1.625f64).powi(2);
        assert!((hyper_exp.variance().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn balanced_means_fit() {
        let hyper_exp = HyperExp::from_mean_cv(4.0, 2.0).unwrap();
        let mean = hyper_exp.mean().unwrap();
        let cv = hyper_exp.variance().unwrap().sqrt() / mean;
        assert!((mean - 4.0).abs() < 1e-9);
        assert!((cv - 2.0).abs() < 1e-9);
        assert!(HyperExp::from_mean_cv(4.0, 0.5).is_err());
    }

    #[test]
    fn invalid_probability_is_rejected() {
        assert!(matches!(
            HyperExp::new(1.2, 1.0, 1.0),
            Err(ParameterError::ProbabilityOutOfRange { name: "p", .. })
        ));
    }

    #[test]
    fn hyper_exp_samples_match_expectation() {
        let hyper_exp = HyperExp::new(0.25, 2.0, 0.5).unwrap();
        let expected = hyper_exp.mean().unwrap();
        let mut uniform_rng = UniformRNG::default();
        let mean = (0..50000)
            .map(|_| hyper_exp.random_variate(&mut uniform_rng).unwrap())
            .sum::<f64>()
            / 50000.0;
        assert!((mean - expected).abs() / expected < 0.03);
    }
}
