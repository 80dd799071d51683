//! Seeded 3D scalar noise used for terrain heights.

use noise::{NoiseFn, OpenSimplex};

/// Deterministic, continuous 3D noise in `[-1, 1]`.
///
/// Seeded once per session; the same seed and inputs always produce the
/// same value.
#[derive(Clone, Debug)]
pub struct NoiseField {
    simplex: OpenSimplex,
}

impl NoiseField {
    /// Creates a field for the given session seed.
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
        }
    }

    /// Samples the field. Output is clamped to `[-1, 1]`.
    pub fn sample3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z]).clamp(-1.0, 1.0)
    }
}
