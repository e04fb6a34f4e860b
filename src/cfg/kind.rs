use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Device category of a grid.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceKind {
    /// Receiver whose position and clock drift are unknown
    /// and resolved by the inversion.
    #[default]
    Node,

    /// Emitter at a known position, firing at scheduled shot times.
    Source,

    /// Third device category. Pingers are built and handed to the inversion,
    /// but do not contribute to the travel time equations yet.
    Pinger,
}

impl DeviceKind {
    /// Numbering flag, leading digit of every device number.
    pub fn flag(&self) -> usize {
        match self {
            Self::Node => 1,
            Self::Source => 2,
            Self::Pinger => 3,
        }
    }

    /// True when this category carries a [crate::prelude::ShotSchedule].
    pub fn has_shot_schedule(&self) -> bool {
        matches!(self, Self::Source)
    }

    /// True when this category carries unknowns that the inversion resolves.
    pub fn is_invertible(&self) -> bool {
        matches!(self, Self::Node)
    }

    /// True when this category contributes to the travel time equations,
    /// either as unknown or as reference.
    pub fn participates_in_inversion(&self) -> bool {
        match self {
            Self::Node | Self::Source => true,
            Self::Pinger => false,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Node => write!(fmt, "node"),
            Self::Source => write!(fmt, "source"),
            Self::Pinger => write!(fmt, "pinger"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "node" | "nodes" => Ok(Self::Node),
            "source" | "sources" => Ok(Self::Source),
            "pinger" | "pingers" => Ok(Self::Pinger),
            _ => Err(Error::UnknownDeviceKind),
        }
    }
}
