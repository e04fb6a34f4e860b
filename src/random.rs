//! Seedable standard normal sample source
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of standard normal (mean 0, standard deviation 1) samples.
/// Layouts draw every perturbation through this trait, so a run
/// (or a test) decides how reproducible its random scatter is.
pub trait NormalSource {
    /// Draw one standard normal sample
    fn standard_normal(&mut self) -> f64;
}

/// [RandomStream] is the default [NormalSource]. It is seeded once,
/// at the top of a run, and shared by all layouts of that run.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: SmallRng,
}

impl RandomStream {
    /// Reproducible [RandomStream]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// [RandomStream] seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Seed from `seed` when known, from OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl NormalSource for RandomStream {
    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}
