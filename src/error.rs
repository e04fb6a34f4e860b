use thiserror::Error;

use crate::prelude::DeviceKind;

/// Configuration and setup errors. Any of these aborts the run
/// before a single node is inverted.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// A device grid needs at least one inline and one crossline.
    #[error("{kind}: invalid grid extents {inline}x{crossline}")]
    InvalidExtents {
        kind: DeviceKind,
        inline: usize,
        crossline: usize,
    },

    /// Grid spacing must be strictly positive: positions increase
    /// with the indices, starting at the lower left corner.
    #[error("{kind}: invalid grid spacing dx={dx} dy={dy}")]
    InvalidSpacing { kind: DeviceKind, dx: f64, dy: f64 },

    /// Perturbation moments may not use negative (or NaN) standard deviations.
    #[error("{kind}: invalid perturbation standard deviation")]
    InvalidStandardDeviation { kind: DeviceKind },

    #[error("invalid sound velocity: {0} m/s")]
    InvalidVelocity(f64),

    #[error("invalid nominal shot interval: {0} s")]
    InvalidShotInterval(f64),

    #[error("invalid residual threshold: {0} s")]
    InvalidThreshold(f64),

    #[error("iteration cap must be at least 1")]
    InvalidIterationCap,

    /// Failed to parse a device kind
    #[error("unknown device kind")]
    UnknownDeviceKind,

    /// Only [DeviceKind::Node] collections carry unknowns.
    #[error("{0} collection cannot be inverted")]
    NotInvertible(DeviceKind),

    /// Sources must come with their [crate::prelude::ShotSchedule].
    #[error("{0} collection has no shot schedule")]
    MissingShotSchedule(DeviceKind),
}
