//! Seeded 3D noise behind the [`NoiseSource`] seam.
//!
//! [`PerlinNoise`] wraps `noise::Perlin` (shuffled 256-entry permutation,
//! quintic fade, cube-edge gradients). Output is clamped to [-1, 1].

use ::noise::{NoiseFn, Perlin};

/// A deterministic scalar noise function of three variables.
///
/// The flow field samples through this trait so tests can substitute
/// hand-built sources. Implementations must be pure: same inputs, same
/// output, bit for bit.
pub trait NoiseSource: Send + Sync {
    /// Sample the noise at `(x, y, z)`. Finite inputs give a value in [-1, 1].
    fn noise(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Perlin noise seeded from a 64-bit simulation seed.
#[derive(Clone)]
pub struct PerlinNoise {
    seed: u64,
    perlin: Perlin,
}

impl PerlinNoise {
    /// The same seed always yields the same field.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perlin: Perlin::new(fold_seed(seed)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl NoiseSource for PerlinNoise {
    fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z]).clamp(-1.0, 1.0)
    }
}

/// Folds the high half into the low half; seeds below 2^32 pass unchanged.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
