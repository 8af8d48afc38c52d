use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

const DEFAULT_SEED: u64 = 42;

/// The uniform random number generator backs every variate drawn in one
/// random stream.  Samplers borrow it mutably for each draw, so a seeded
/// stream is reproducible and draws are never interleaved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformRNG {
    rng: Pcg64Mcg,
}

impl Default for UniformRNG {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl UniformRNG {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Access to the underlying generator, for `rand_distr` samplers.
    pub fn rng(&mut self) -> &mut Pcg64Mcg {
        &mut self.rng
    }

    /// A uniform value in [0, 1).
    pub fn raw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// A uniform value in [0, 1].
    pub fn uniform01(&mut self) -> f64 {
        self.rng.gen_range(0.0..=1.0)
    }

    /// A uniform value in (0, 1], safe to take the logarithm of.
    pub fn open_closed01(&mut self) -> f64 {
        1.0 - self.raw()
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg64Mcg::seed_from_u64(seed);
    }
}
