//! Gaussian perturbations
use nalgebra::{DVector, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::random::NormalSource;

/// Per axis Gaussian parameters. The same [Moment] describes spatial scatter
/// (inline, crossline, depth) and clock drift scatter (0th, 1st, 2nd order).
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Moment {
    /// Mean value, per axis
    #[cfg_attr(feature = "serde", serde(default))]
    pub mean: (f64, f64, f64),
    /// Standard deviation, per axis
    #[cfg_attr(feature = "serde", serde(default))]
    pub std: (f64, f64, f64),
}

impl Moment {
    /// Axes described by a [Moment]
    pub const DIM: usize = 3;

    /// Creates a new [Moment]
    pub fn new(mean: (f64, f64, f64), std: (f64, f64, f64)) -> Self {
        Self { mean, std }
    }

    /// Zero mean [Moment]
    pub fn centered(std: (f64, f64, f64)) -> Self {
        Self::new((0.0, 0.0, 0.0), std)
    }

    /// Deterministic [Moment] (null standard deviation): every sample equals `mean`.
    pub fn fixed(mean: (f64, f64, f64)) -> Self {
        Self::new(mean, (0.0, 0.0, 0.0))
    }

    /// Mean as [Vector3]
    pub fn mean(&self) -> Vector3<f64> {
        Vector3::new(self.mean.0, self.mean.1, self.mean.2)
    }

    /// Standard deviation as [Vector3]
    pub fn std(&self) -> Vector3<f64> {
        Vector3::new(self.std.0, self.std.1, self.std.2)
    }

    /// True when all standard deviations are positive or null.
    pub fn is_valid(&self) -> bool {
        self.std().iter().all(|s| *s >= 0.0)
    }
}

/// [Perturbation] maps a [Moment] to independent normal draws,
/// using the injected [NormalSource].
pub struct Perturbation<'a, N: NormalSource> {
    normal: &'a mut N,
}

impl<'a, N: NormalSource> Perturbation<'a, N> {
    pub fn new(normal: &'a mut N) -> Self {
        Self { normal }
    }

    /// Draws `mean[i] + std[i] * n` for each of the first `dim` axes.
    /// `dim` may not exceed [Moment::DIM].
    pub fn sample(&mut self, moment: &Moment, dim: usize) -> DVector<f64> {
        assert!(
            dim <= Moment::DIM,
            "internal error: perturbation dimension exceeds moment dimension"
        );

        let (mean, std) = (moment.mean(), moment.std());

        DVector::from_fn(dim, |i, _| mean[i] + std[i] * self.normal.standard_normal())
    }

    /// Draws one 3D perturbation.
    pub fn sample3(&mut self, moment: &Moment) -> Vector3<f64> {
        let perturb = self.sample(moment, Moment::DIM);
        Vector3::new(perturb[0], perturb[1], perturb[2])
    }
}
