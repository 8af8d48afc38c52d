//! JS/WASM-compatible interfaces to the random variables.  Configurations
//! are passed as JSON or YAML text, and errors are returned as strings
//! wrapped in a `JsValue`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::input_modeling::{ContinuousRandomVariable, UniformRNG};
use crate::utils::set_panic_hook;

fn to_js<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// A configured continuous random variable with its own uniform random
/// number stream.
#[wasm_bindgen]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomVariable {
    variable: ContinuousRandomVariable,
    uniform_rng: UniformRNG,
}

impl RandomVariable {
    pub fn new(variable: ContinuousRandomVariable, seed: u64) -> Self {
        Self {
            variable,
            uniform_rng: UniformRNG::new(seed),
        }
    }

    pub fn variable(&self) -> &ContinuousRandomVariable {
        &self.variable
    }
}

#[wasm_bindgen]
impl RandomVariable {
    /// Builds a random variable from its JSON representation, for example
    /// `{"exp": {"lambda": 3.0}}`.
    pub fn post_json(variable: &str, seed: u32) -> Result<RandomVariable, JsValue> {
        set_panic_hook();
        let variable = serde_json::from_str(variable).map_err(to_js)?;
        Ok(Self::new(variable, u64::from(seed)))
    }

    /// Builds a random variable from its YAML representation.
    pub fn post_yaml(variable: &str, seed: u32) -> Result<RandomVariable, JsValue> {
        set_panic_hook();
        let variable = serde_yaml::from_str(variable).map_err(to_js)?;
        Ok(Self::new(variable, u64::from(seed)))
    }

    /// Get a JSON representation of the random variable configuration.
    pub fn get_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.variable).map_err(to_js)
    }

    /// Get a YAML representation of the random variable configuration.
    pub fn get_yaml(&self) -> Result<String, JsValue> {
        serde_yaml::to_string(&self.variable).map_err(to_js)
    }

    pub fn random_variate(&mut self) -> Result<f64, JsValue> {
        self.variable
            .random_variate(&mut self.uniform_rng)
            .map_err(to_js)
    }

    pub fn random_variates(&mut self, count: usize) -> Result<Vec<f64>, JsValue> {
        (0..count).map(|_| self.random_variate()).collect()
    }

    pub fn mean(&self) -> Result<f64, JsValue> {
        self.variable.mean().map_err(to_js)
    }

    pub fn variance(&self) -> Result<f64, JsValue> {
        self.variable.variance().map_err(to_js)
    }

    pub fn reseed(&mut self, seed: u32) {
        self.uniform_rng.reseed(u64::from(seed));
    }
}
