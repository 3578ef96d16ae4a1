use nalgebra::{Unit, Vector3};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const POLE_EPSILON: f64 = 1e-10;

/// Angular extent swept by a [`NormalSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Polar angle in `[0, π/2]`; a plane normal and its negation are equivalent.
    Hemisphere,
    /// Polar angle in `[0, π]`.
    Sphere,
}

impl Coverage {
    fn polar_bound(self) -> f64 {
        match self {
            Self::Hemisphere => FRAC_PI_2,
            Self::Sphere => PI,
        }
    }
}

/// Deterministic generator of candidate membrane normals.
///
/// The polar angle α advances in steps of the angular resolution; for each α
/// the azimuth β advances in steps of `resolution / sin α`, which keeps the
/// arc length between neighbouring samples roughly constant. At the pole the
/// ring collapses to the single vector `(0, 0, 1)`.
#[derive(Debug, Clone)]
pub struct NormalSampler {
    resolution: f64,
    coverage: Coverage,
    alpha: f64,
    beta: f64,
    beta_step: f64,
    exhausted: bool,
}

impl NormalSampler {
    /// # Arguments
    ///
    /// * `resolution` - Angular step in radians. Must be positive.
    /// * `coverage` - Whether to sweep a hemisphere or the full sphere.
    pub fn new(resolution: f64, coverage: Coverage) -> Self {
        let mut sampler = Self {
            resolution,
            coverage,
            alpha: 0.0,
            beta: 0.0,
            beta_step: TAU,
            exhausted: false,
        };
        sampler.reset();
        sampler
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Restarts the sequence from the pole.
    pub fn reset(&mut self) {
        self.alpha = 0.0;
        self.beta = 0.0;
        self.exhausted = !(self.resolution.is_finite() && self.resolution > 0.0);
        self.beta_step = Self::azimuth_step(self.resolution, self.alpha);
    }

    fn azimuth_step(resolution: f64, alpha: f64) -> f64 {
        let sin_alpha = alpha.sin();
        if sin_alpha < POLE_EPSILON {
            TAU
        } else {
            (resolution / sin_alpha).min(TAU)
        }
    }

    fn advance(&mut self) {
        self.beta += self.beta_step;
        if self.beta < TAU - POLE_EPSILON {
            return;
        }
        self.beta = 0.0;
        self.alpha += self.resolution;
        if self.alpha > self.coverage.polar_bound() + POLE_EPSILON {
            self.exhausted = true;
            return;
        }
        self.beta_step = Self::azimuth_step(self.resolution, self.alpha);
    }
}

impl Iterator for NormalSampler {
    type Item = Unit<Vector3<f64>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let vector = if sin_a < POLE_EPSILON {
            Vector3::new(0.0, 0.0, cos_a.signum())
        } else {
            let (sin_b, cos_b) = self.beta.sin_cos();
            Vector3::new(sin_a * cos_b, sin_a * sin_b, cos_a)
        };
        self.advance();
        Some(Unit::new_normalize(vector))
    }
}
