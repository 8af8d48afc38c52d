//! # Overview
//! "mapsim" provides the random variate engine of a discrete event
//! simulation: stochastic processes whose parameters are derived from
//! continuous-time Markov chain generators, for Rust- and npm-based
//! simulation products and projects.
//!
//! This repository contains:
//!
//! * Random variable framework, covering elementary distributions and the
//! Markovian Arrival Process, Phase-Type, MMPP2, Coxian and
//! Hyperexponential families, each with validated, derived parameters.
//! * Burst interval controller, a renewal process alternating between two
//! interval types and coordinating boundaries with an event scheduler.
//! * Output analysis tools, for checking generated variates statistically.
//! * Simulator interfaces, the event scheduling seam consumed by stateful
//! random variables.
//!
//! mapsim is compatible with a wide variety of compilation targets,
//! including WASM.  mapsim does not require nightly Rust.
pub mod input_modeling;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
pub mod web;
