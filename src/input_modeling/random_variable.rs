//! Random variables underpin both stochastic and deterministic model
//! behaviors, in that deterministic operation is simply a random variable
//! with a single value of probability 1.  Elementary distributions, with
//! their common parameterizations, and the matrix-derived composite
//! distributions are wrapped in the enums `Continuous` and `Discrete`.

use rand::distributions::Distribution;
use rand_distr::{Gamma, Poisson};
use serde::{Deserialize, Serialize};

use super::elementary::{self, finite, positive};
use super::{Coxian, HyperExp, Map, Mmpp2, PhaseType, UniformRNG};
use crate::utils::errors::{ParameterError, SimulationError};
use crate::utils::{gamma, ln_gamma, standard_normal_cdf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuous {
    Exp { lambda: f64 },
    Uniform { min: f64, max: f64 },
    /// Truncated to positive variates, for use as a duration
    Normal { mean: f64, std_dev: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Weibull { shape: f64, scale: f64 },
    /// Support starts at `scale`
    Pareto { scale: f64, shape: f64 },
    Gamma { shape: f64, scale: f64 },
    Erlang { shape: u32, lambda: f64 },
    /// Tabulated values with their probabilities
    Empirical { values: Vec<f64>, probabilities: Vec<f64> },
    Map(Map),
    Mmpp2(Mmpp2),
    PhaseType(PhaseType),
    Coxian(Coxian),
    HyperExp(HyperExp),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Discrete {
    Poisson { lambda: f64 },
}

impl Continuous {
    /// Checks the parameters of the elementary families.  Composite
    /// parameters are validated when they are built.
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            Continuous::Exp { lambda } => positive("lambda", *lambda).map(|_| ()),
            Continuous::Uniform { min, max } => {
                finite("min", *min)?;
                finite("max", *max)?;
                if min > max {
                    return Err(ParameterError::InvalidRange {
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
            Continuous::Normal { mean, std_dev } => {
                finite("mean", *mean)?;
                positive("std_dev", *std_dev).map(|_| ())
            }
            Continuous::LogNormal { mu, sigma } => {
                finite("mu", *mu)?;
                positive("sigma", *sigma).map(|_| ())
            }
            Continuous::Weibull { shape, scale } | Continuous::Gamma { shape, scale } => {
                positive("shape", *shape)?;
                positive("scale", *scale).map(|_| ())
            }
            Continuous::Pareto { scale, shape } => {
                positive("scale", *scale)?;
                positive("shape", *shape).map(|_| ())
            }
            Continuous::Erlang { shape, lambda } => {
                positive("shape", f64::from(*shape))?;
                positive("lambda", *lambda).map(|_| ())
            }
            Continuous::Empirical {
                values,
                probabilities,
            } => elementary::validate_empirical(values, probabilities),
            Continuous::Coxian(coxian) => coxian.validate(),
            Continuous::HyperExp(hyper_exp) => hyper_exp.validate(),
            Continuous::Map(_) | Continuous::Mmpp2(_) | Continuous::PhaseType(_) => Ok(()),
        }
    }

    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the simulation, and produces a f64 random variate.
    /// MAP and MMPP2 variables advance their hidden phase.
    pub fn random_variate(&mut self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        self.validate()?;
        match self {
            Continuous::Exp { lambda } => Ok(elementary::exponential(*lambda, uniform_rng.raw())),
            Continuous::Uniform { min, max } => {
                Ok(elementary::uniform(*min, *max, uniform_rng.raw()))
            }
            Continuous::Normal { mean, std_dev } => {
                Ok(elementary::positive_normal(*mean, *std_dev, uniform_rng)?)
            }
            Continuous::LogNormal { mu, sigma } => {
                let (z, _) =
                    elementary::box_muller(uniform_rng.open_closed01(), uniform_rng.raw());
                Ok((*mu + *sigma * z).exp())
            }
            Continuous::Weibull { shape, scale } => {
                Ok(elementary::weibull(*shape, *scale, uniform_rng.raw()))
            }
            Continuous::Pareto { scale, shape } => {
                Ok(elementary::pareto(*scale, *shape, uniform_rng.raw()))
            }
            Continuous::Gamma { shape, scale } => {
                Ok(Gamma::new(*shape, *scale)?.sample(uniform_rng.rng()))
            }
            Continuous::Erlang { shape, lambda } => {
                Ok(elementary::erlang(*shape, *lambda, uniform_rng))
            }
            Continuous::Empirical {
                values,
                probabilities,
            } => Ok(elementary::empirical(values, probabilities, uniform_rng.raw())),
            Continuous::Map(map) => Ok(map.random_variate(uniform_rng)),
            Continuous::Mmpp2(mmpp2) => Ok(mmpp2.random_variate(uniform_rng)),
            Continuous::PhaseType(phase_type) => Ok(phase_type.random_variate(uniform_rng)),
            Continuous::Coxian(coxian) => Ok(coxian.random_variate(uniform_rng)?),
            Continuous::HyperExp(hyper_exp) => Ok(hyper_exp.random_variate(uniform_rng)?),
        }
    }

    /// The expected value.  Normal variables report their configured mean,
    /// ignoring the truncation applied when sampling.
    pub fn mean(&self) -> Result<f64, SimulationError> {
        self.validate()?;
        Ok(match self {
            Continuous::Exp { lambda } => 1.0 / lambda,
            Continuous::Uniform { min, max } => (min + max) / 2.0,
            Continuous::Normal { mean, .. } => *mean,
            Continuous::LogNormal { mu, sigma } => (mu + sigma.powi(2) / 2.0).exp(),
            Continuous::Weibull { shape, scale } => scale * gamma(1.0 + 1.0 / shape),
            Continuous::Pareto { scale, shape } => {
                if *shape > 1.0 {
                    shape * scale / (shape - 1.0)
                } else {
                    f64::INFINITY
                }
            }
            Continuous::Gamma { shape, scale } => shape * scale,
            Continuous::Erlang { shape, lambda } => f64::from(*shape) / lambda,
            Continuous::Empirical {
                values,
                probabilities,
            } => values.iter().zip(probabilities).map(|(v, p)| v * p).sum(),
            Continuous::Map(map) => map.parameter().mean(),
            Continuous::Mmpp2(mmpp2) => mmpp2.parameter().mean(),
            Continuous::PhaseType(phase_type) => phase_type.parameter().mean(),
            Continuous::Coxian(coxian) => coxian.mean()?,
            Continuous::HyperExp(hyper_exp) => hyper_exp.mean()?,
        })
    }

    pub fn variance(&self) -> Result<f64, SimulationError> {
        self.validate()?;
        Ok(match self {
            Continuous::Exp { lambda } => 1.0 / lambda.powi(2),
            Continuous::Uniform { min, max } => (max - min).powi(2) / 12.0,
            Continuous::Normal { std_dev, .. } => std_dev.powi(2),
            Continuous::LogNormal { mu, sigma } => {
                (sigma.powi(2).exp() - 1.0) * (2.0 * mu + sigma.powi(2)).exp()
            }
            Continuous::Weibull { shape, scale } => {
                scale.powi(2) * (gamma(1.0 + 2.0 / shape) - gamma(1.0 + 1.0 / shape).powi(2))
            }
            Continuous::Pareto { scale, shape } => {
                if *shape > 2.0 {
                    scale.powi(2) * shape / ((shape - 1.0).powi(2) * (shape - 2.0))
                } else {
                    f64::INFINITY
                }
            }
            Continuous::Gamma { shape, scale } => shape * scale.powi(2),
            Continuous::Erlang { shape, lambda } => f64::from(*shape) / lambda.powi(2),
            Continuous::Empirical {
                values,
                probabilities,
            } => {
                let mean = self.mean()?;
                values
                    .iter()
                    .zip(probabilities)
                    .map(|(v, p)| p * (v - mean).powi(2))
                    .sum()
            }
            Continuous::Map(map) => map.parameter().variance(),
            Continuous::Mmpp2(mmpp2) => mmpp2.parameter().variance(),
            Continuous::PhaseType(phase_type) => phase_type.parameter().variance(),
            Continuous::Coxian(coxian) => coxian.variance()?,
            Continuous::HyperExp(hyper_exp) => hyper_exp.variance()?,
        })
    }

    /// Probability density at `x`.  Families without a closed form, and
    /// the composite families, report zero.
    pub fn pdf(&self, x: f64) -> Result<f64, SimulationError> {
        self.validate()?;
        Ok(match self {
            Continuous::Exp { lambda } => {
                if x < 0.0 {
                    0.0
                } else {
                    lambda * (-lambda * x).exp()
                }
            }
            Continuous::Uniform { min, max } => {
                if x < *min || x > *max || min == max {
                    0.0
                } else {
                    1.0 / (max - min)
                }
            }
            Continuous::Normal { mean, std_dev } => {
                let z = (x - mean) / std_dev;
                (-z * z / 2.0).exp() / (std_dev * std::f64::consts::TAU.sqrt())
            }
            Continuous::LogNormal { mu, sigma } => {
                if x <= 0.0 {
                    0.0
                } else {
                    let z = (x.ln() - mu) / sigma;
                    (-z * z / 2.0).exp() / (x * sigma * std::f64::consts::TAU.sqrt())
                }
            }
            Continuous::Weibull { shape, scale } => {
                if x < 0.0 {
                    0.0
                } else {
                    let ratio = x / scale;
                    shape / scale * ratio.powf(shape - 1.0) * (-ratio.powf(*shape)).exp()
                }
            }
            Continuous::Pareto { scale, shape } => {
                if x < *scale {
                    0.0
                } else {
                    shape * scale.powf(*shape) / x.powf(shape + 1.0)
                }
            }
            Continuous::Gamma { shape, scale } => {
                if x <= 0.0 {
                    0.0
                } else {
                    ((shape - 1.0) * x.ln() - x / scale - ln_gamma(*shape) - shape * scale.ln())
                        .exp()
                }
            }
            Continuous::Erlang { shape, lambda } => {
                if x < 0.0 {
                    0.0
                } else if x == 0.0 {
                    if *shape == 1 {
                        *lambda
                    } else {
                        0.0
                    }
                } else {
                    let k = f64::from(*shape);
                    (k * lambda.ln() + (k - 1.0) * x.ln() - lambda * x - ln_gamma(k)).exp()
                }
            }
            Continuous::Empirical {
                values,
                probabilities,
            } => elementary::empirical_pdf(values, probabilities, x),
            Continuous::Map(_)
            | Continuous::Mmpp2(_)
            | Continuous::PhaseType(_)
            | Continuous::Coxian(_)
            | Continuous::HyperExp(_) => 0.0,
        })
    }

    /// Cumulative probability at `x`.  Families without a closed form, and
    /// the composite families, report zero.
    pub fn cdf(&self, x: f64) -> Result<f64, SimulationError> {
        self.validate()?;
        Ok(match self {
            Continuous::Exp { lambda } => {
                if x < 0.0 {
                    0.0
                } else {
                    1.0 - (-lambda * x).exp()
                }
            }
            Continuous::Uniform { min, max } => {
                if x < *min {
                    0.0
                } else if x >= *max {
                    1.0
                } else {
                    (x - min) / (max - min)
                }
            }
            Continuous::Normal { mean, std_dev } => standard_normal_cdf((x - mean) / std_dev),
            Continuous::LogNormal { mu, sigma } => {
                if x <= 0.0 {
                    0.0
                } else {
                    standard_normal_cdf((x.ln() - mu) / sigma)
                }
            }
            Continuous::Weibull { shape, scale } => {
                if x < 0.0 {
                    0.0
                } else {
                    1.0 - (-(x / scale).powf(*shape)).exp()
                }
            }
            Continuous::Pareto { scale, shape } => {
                if x < *scale {
                    0.0
                } else {
                    1.0 - (scale / x).powf(*shape)
                }
            }
            Continuous::Erlang { shape, lambda } => {
                if x < 0.0 {
                    0.0
                } else {
                    // 1 - sum_{n < k} e^{-lambda x} (lambda x)^n / n!
                    let rate = lambda * x;
                    let (tail, _) = (0..*shape).fold((0.0, (-rate).exp()), |(sum, term), n| {
                        (sum + term, term * rate / f64::from(n + 1))
                    });
                    1.0 - tail
                }
            }
            Continuous::Empirical {
                values,
                probabilities,
            } => elementary::empirical_cdf(values, probabilities, x),
            Continuous::Gamma { .. }
            | Continuous::Map(_)
            | Continuous::Mmpp2(_)
            | Continuous::PhaseType(_)
            | Continuous::Coxian(_)
            | Continuous::HyperExp(_) => 0.0,
        })
    }

    /// A copy of this random variable rescaled to the given mean, holding
    /// the coefficient of variation constant.
    pub fn with_mean(&self, mean: f64) -> Result<Continuous, SimulationError> {
        let factor = positive("mean", mean)? / self.mean()?;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(SimulationError::UnsupportedOperation(
                "rescaling a distribution without a finite positive mean",
            ));
        }
        Ok(match self {
            Continuous::Exp { .. } => Continuous::Exp { lambda: 1.0 / mean },
            Continuous::Uniform { min, max } => Continuous::Uniform {
                min: min * factor,
                max: max * factor,
            },
            Continuous::Normal { mean: center, std_dev } => Continuous::Normal {
                mean: center * factor,
                std_dev: std_dev * factor,
            },
            Continuous::LogNormal { mu, sigma } => Continuous::LogNormal {
                mu: mu + factor.ln(),
                sigma: *sigma,
            },
            Continuous::Weibull { shape, scale } => Continuous::Weibull {
                shape: *shape,
                scale: scale * factor,
            },
            Continuous::Pareto { scale, shape } => Continuous::Pareto {
                scale: scale * factor,
                shape: *shape,
            },
            Continuous::Gamma { shape, scale } => Continuous::Gamma {
                shape: *shape,
                scale: scale * factor,
            },
            Continuous::Erlang { shape, lambda } => Continuous::Erlang {
                shape: *shape,
                lambda: lambda / factor,
            },
            Continuous::Empirical { .. } => {
                return Err(SimulationError::UnsupportedOperation(
                    "rescaling an empirical table",
                ))
            }
            Continuous::Map(map) => Continuous::Map(map.with_mean(mean)?),
            Continuous::Mmpp2(mmpp2) => Continuous::Mmpp2(mmpp2.with_mean(mean)?),
            Continuous::PhaseType(phase_type) => Continuous::PhaseType(phase_type.with_mean(mean)?),
            Continuous::Coxian(coxian) => Continuous::Coxian(coxian.with_mean(mean)?),
            Continuous::HyperExp(hyper_exp) => Continuous::HyperExp(hyper_exp.with_mean(mean)?),
        })
    }
}

impl Discrete {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires the random number
    /// generator of the simulation, and produces a u64 random variate.
    pub fn random_variate(&mut self, uniform_rng: &mut UniformRNG) -> Result<u64, SimulationError> {
        match self {
            Discrete::Poisson { lambda } => {
                Ok(Poisson::new(*lambda)?.sample(uniform_rng.rng()) as u64)
            }
        }
    }

    pub fn mean(&self) -> Result<f64, SimulationError> {
        match self {
            Discrete::Poisson { lambda } => Ok(positive("lambda", *lambda)?),
        }
    }

    pub fn variance(&self) -> Result<f64, SimulationError> {
        match self {
            Discrete::Poisson { lambda } => Ok(positive("lambda", *lambda)?),
        }
    }

    /// A Poisson variable has a single parameter, so the coefficient of
    /// variation cannot be held while the mean changes.
    pub fn with_mean(&self, _mean: f64) -> Result<Discrete, SimulationError> {
        match self {
            Discrete::Poisson { .. } => Err(SimulationError::UnsupportedOperation(
                "rescaling a Poisson variable",
            )),
        }
    }
}
