#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        MAX_CONDITION_NUMBER, MAX_ITERATIONS, MAX_RESIDUAL_S, MIN_DISTANCE_M, SHOT_INTERVAL_S,
        SOUND_VELOCITY_M_S,
    },
    grid::GridParameters,
    perturbation::Moment,
    prelude::Error,
};

mod kind;
pub use kind::DeviceKind;

fn default_velocity() -> f64 {
    SOUND_VELOCITY_M_S
}

fn default_shot_interval() -> f64 {
    SHOT_INTERVAL_S
}

fn default_drift_inversion() -> bool {
    true
}

fn default_max_residual() -> f64 {
    MAX_RESIDUAL_S
}

fn default_max_iter() -> usize {
    MAX_ITERATIONS
}

fn default_min_distance() -> f64 {
    MIN_DISTANCE_M
}

fn default_max_condition() -> f64 {
    MAX_CONDITION_NUMBER
}

fn default_verbose() -> bool {
    true
}

fn default_nodes() -> DeviceConfig {
    DeviceConfig {
        origin: (50.0, 50.0, 1000.0),
        spacing: (50.0, 50.0),
        extents: (3, 3),
        location: Moment::centered((10.0, 10.0, 5.0)),
        drift: Moment::centered((1.0E-3, 1.0E-4, 1.0E-5)),
    }
}

fn default_sources() -> DeviceConfig {
    DeviceConfig {
        origin: (0.0, 0.0, 0.0),
        spacing: (100.0, 100.0),
        extents: (3, 3),
        location: Moment::default(),
        drift: Moment::centered((1.0E-3, 0.0, 0.0)),
    }
}

fn default_pingers() -> DeviceConfig {
    DeviceConfig {
        origin: (0.0, 0.0, 1000.0),
        spacing: (10.0, 150.0),
        extents: (3, 3),
        location: Moment::default(),
        drift: Moment::default(),
    }
}

/// Layout and scatter of one device collection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// (x0, y0, z0) position of the first device, in meters
    pub origin: (f64, f64, f64),
    /// (dx, dy) inline and crossline spacing, in meters
    pub spacing: (f64, f64),
    /// Number of (inlines, crosslines)
    pub extents: (usize, usize),
    /// Spatial scatter of the actual position around the nominal position
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Moment,
    /// Scatter of the actual clock drift coefficients
    #[cfg_attr(feature = "serde", serde(default))]
    pub drift: Moment,
}

impl DeviceConfig {
    /// Returns validated [GridParameters] for this [DeviceKind].
    pub fn parameters(&self, kind: DeviceKind) -> Result<GridParameters, Error> {
        if !self.location.is_valid() || !self.drift.is_valid() {
            return Err(Error::InvalidStandardDeviation { kind });
        }
        GridParameters::new(kind, self.origin, self.spacing, self.extents)
    }

    /// Copies and returns [Self] with updated location [Moment].
    pub fn with_location(&self, location: Moment) -> Self {
        let mut s = *self;
        s.location = location;
        s
    }

    /// Copies and returns [Self] with updated drift [Moment].
    pub fn with_drift(&self, drift: Moment) -> Self {
        let mut s = *self;
        s.drift = drift;
        s
    }
}

/// Gauss-Newton inversion options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InversionOpts {
    /// Also resolve the node clock drift coefficients (6 unknowns instead of 3).
    #[cfg_attr(feature = "serde", serde(default = "default_drift_inversion"))]
    pub drift: bool,
    /// A node converges once its largest travel time residual drops
    /// below this value, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_max_residual"))]
    pub max_residual_s: f64,
    /// Maximal number of updates (emergency break).
    #[cfg_attr(feature = "serde", serde(default = "default_max_iter"))]
    pub max_iter: usize,
    /// Source to node distances below this floor are degenerate, in meters.
    #[cfg_attr(feature = "serde", serde(default = "default_min_distance"))]
    pub min_distance_m: f64,
    /// Largest tolerated condition number of the scaled normal matrix.
    #[cfg_attr(feature = "serde", serde(default = "default_max_condition"))]
    pub max_condition: f64,
}

impl Default for InversionOpts {
    fn default() -> Self {
        Self {
            drift: default_drift_inversion(),
            max_residual_s: default_max_residual(),
            max_iter: default_max_iter(),
            min_distance_m: default_min_distance(),
            max_condition: default_max_condition(),
        }
    }
}

/// Debug traces to emit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Verbosity {
    /// Trace every Gauss-Newton iteration
    #[cfg_attr(feature = "serde", serde(default = "default_verbose"))]
    pub iterations: bool,
    /// Trace nominal and actual locations of all devices
    #[cfg_attr(feature = "serde", serde(default = "default_verbose"))]
    pub locations: bool,
    /// Trace actual clock drift of all devices
    #[cfg_attr(feature = "serde", serde(default = "default_verbose"))]
    pub drift: bool,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self {
            iterations: default_verbose(),
            locations: default_verbose(),
            drift: default_verbose(),
        }
    }
}

impl Verbosity {
    /// No debug traces at all
    pub fn quiet() -> Self {
        Self {
            iterations: false,
            locations: false,
            drift: false,
        }
    }
}

/// Complete description of one synthetic experiment.
/// [Config] is built once and shared by reference with every component.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Receivers to invert for
    #[cfg_attr(feature = "serde", serde(default = "default_nodes"))]
    pub nodes: DeviceConfig,
    /// Emitters at known positions
    #[cfg_attr(feature = "serde", serde(default = "default_sources"))]
    pub sources: DeviceConfig,
    /// Pingers (not used by the travel time equations)
    #[cfg_attr(feature = "serde", serde(default = "default_pingers"))]
    pub pingers: DeviceConfig,
    /// Sound velocity, in m.s⁻¹
    #[cfg_attr(feature = "serde", serde(default = "default_velocity"))]
    pub velocity_m_s: f64,
    /// Nominal interval between two shots, in seconds
    #[cfg_attr(feature = "serde", serde(default = "default_shot_interval"))]
    pub shot_interval_s: f64,
    /// [InversionOpts]
    #[cfg_attr(feature = "serde", serde(default))]
    pub inversion: InversionOpts,
    /// Seed of the random stream. Seeds from OS entropy when undefined.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    /// [Verbosity]
    #[cfg_attr(feature = "serde", serde(default))]
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            sources: default_sources(),
            pingers: default_pingers(),
            velocity_m_s: default_velocity(),
            shot_interval_s: default_shot_interval(),
            inversion: InversionOpts::default(),
            seed: None,
            verbosity: Verbosity::default(),
        }
    }
}

impl Config {
    /// Returns [Config] without any random scatter: actual positions
    /// and drifts match their nominal values.
    pub fn unperturbed() -> Self {
        let mut s = Self::default();
        for device in [&mut s.nodes, &mut s.sources, &mut s.pingers] {
            device.location = Moment::default();
            device.drift = Moment::default();
        }
        s
    }

    /// Copies and returns [Self] with updated node [DeviceConfig].
    pub fn with_nodes(&self, nodes: DeviceConfig) -> Self {
        let mut s = self.clone();
        s.nodes = nodes;
        s
    }

    /// Copies and returns [Self] with updated source [DeviceConfig].
    pub fn with_sources(&self, sources: DeviceConfig) -> Self {
        let mut s = self.clone();
        s.sources = sources;
        s
    }

    /// Copies and returns [Self] with updated pinger [DeviceConfig].
    pub fn with_pingers(&self, pingers: DeviceConfig) -> Self {
        let mut s = self.clone();
        s.pingers = pingers;
        s
    }

    /// Copies and returns [Self] with drift inversion turned on or off.
    pub fn with_drift_inversion(&self, drift: bool) -> Self {
        let mut s = self.clone();
        s.inversion.drift = drift;
        s
    }

    /// Copies and returns [Self] with updated [InversionOpts].
    pub fn with_inversion(&self, inversion: InversionOpts) -> Self {
        let mut s = self.clone();
        s.inversion = inversion;
        s
    }

    /// Copies and returns [Self] with a fixed random seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        let mut s = self.clone();
        s.seed = Some(seed);
        s
    }

    /// Copies and returns [Self] with updated [Verbosity].
    pub fn with_verbosity(&self, verbosity: Verbosity) -> Self {
        let mut s = self.clone();
        s.verbosity = verbosity;
        s
    }

    /// Verifies the global settings and the three [DeviceConfig]s.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.velocity_m_s > 0.0 && self.velocity_m_s.is_finite()) {
            return Err(Error::InvalidVelocity(self.velocity_m_s));
        }
        if !(self.shot_interval_s > 0.0 && self.shot_interval_s.is_finite()) {
            return Err(Error::InvalidShotInterval(self.shot_interval_s));
        }
        if !(self.inversion.max_residual_s > 0.0) {
            return Err(Error::InvalidThreshold(self.inversion.max_residual_s));
        }
        if self.inversion.max_iter == 0 {
            return Err(Error::InvalidIterationCap);
        }

        self.nodes.parameters(DeviceKind::Node)?;
        self.sources.parameters(DeviceKind::Source)?;
        self.pingers.parameters(DeviceKind::Pinger)?;
        Ok(())
    }
}
