#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod cfg;
mod constants;
mod device;
mod error;
mod experiment;
mod grid;
mod inversion;
mod layout;
mod perturbation;
mod random;
mod shot;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{Config, DeviceConfig, DeviceKind, InversionOpts, Verbosity};
    pub use crate::constants::{
        MAX_ITERATIONS, MAX_RESIDUAL_S, SHOT_INTERVAL_S, SOUND_VELOCITY_M_S,
    };
    pub use crate::device::{DeviceCollection, LayoutSnapshot};
    pub use crate::error::Error;
    pub use crate::experiment::Experiment;
    pub use crate::grid::{Grid, GridCell, GridParameters, StateKind, TripleState};
    pub use crate::inversion::{
        drift_polynomial, ForwardModel, Inversion, InversionReport, NodeFailure, NodeReport,
        NodeSolution, NodeState, NormalEquations, TravelTimes,
    };
    pub use crate::layout::Layout;
    pub use crate::perturbation::{Moment, Perturbation};
    pub use crate::random::{NormalSource, RandomStream};
    pub use crate::shot::ShotSchedule;
    // re-export
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
