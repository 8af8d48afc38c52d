//! The input modeling module provides the random variables of the engine.
//! The elementary closed-form distributions serve as building blocks for
//! the composite distributions, whose parameters are derived from
//! continuous-time Markov chain generators: Markovian Arrival Processes,
//! Phase-Type, MMPP2, Coxian and Hyperexponential.  The Burst interval
//! controller alternates between two interval types, and coordinates its
//! boundaries with an external event scheduler.
//!
//! All variates are drawn from a `UniformRNG`, passed by exclusive
//! reference so that seeded streams are reproducible.

pub mod burst;
pub mod coxian;
pub mod elementary;
pub mod generator;
pub mod hyper_exp;
pub mod linalg;
pub mod map;
pub mod mmpp2;
pub mod phase_type;
pub mod random_variable;
pub mod uniform_rng;

pub use burst::{Burst, Interval, IntervalSpec, SelectionPolicy};
pub use coxian::Coxian;
pub use hyper_exp::HyperExp;
pub use map::{Map, MapConfig, MapParameter};
pub use mmpp2::{Mmpp2, Mmpp2Config, Mmpp2Parameter};
pub use phase_type::{PhaseType, PhaseTypeConfig, PhaseTypeParameter};
pub use random_variable::Continuous as ContinuousRandomVariable;
pub use random_variable::Discrete as DiscreteRandomVariable;
pub use uniform_rng::UniformRNG;
