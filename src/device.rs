//! Device collections
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    cfg::{DeviceConfig, Verbosity},
    grid::{Grid, GridCell, GridParameters, StateKind},
    layout::Layout,
    perturbation::Perturbation,
    prelude::{DeviceKind, Error},
    random::NormalSource,
    shot::ShotSchedule,
};

/// [DeviceCollection] bundles the frozen [GridParameters] of one device
/// category, its [Grid] of cells and, for sources, its [ShotSchedule].
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCollection {
    parameters: GridParameters,
    layout: Grid<GridCell>,
    shots: Option<ShotSchedule>,
}

impl DeviceCollection {
    /// Builds a new [DeviceCollection] of given [DeviceKind].
    /// ## Input
    /// - kind: [DeviceKind]
    /// - cfg: [DeviceConfig] of this collection
    /// - shot_interval: nominal shot interval, only used by sources
    /// - normal: [NormalSource] used to scatter the actual states
    /// - verbosity: [Verbosity] of the debug traces
    pub fn new<N: NormalSource>(
        kind: DeviceKind,
        cfg: &DeviceConfig,
        shot_interval: f64,
        normal: &mut N,
        verbosity: &Verbosity,
    ) -> Result<Self, Error> {
        let parameters = cfg.parameters(kind)?;
        let mut perturbation = Perturbation::new(normal);

        let layout = Layout::build(
            &parameters,
            &cfg.location,
            &cfg.drift,
            &mut perturbation,
            verbosity,
        );

        let shots = if kind.has_shot_schedule() {
            Some(ShotSchedule::build(&parameters, shot_interval))
        } else {
            None
        };

        Ok(Self {
            parameters,
            layout,
            shots,
        })
    }

    /// Builds a node [DeviceCollection]
    pub fn nodes<N: NormalSource>(
        cfg: &DeviceConfig,
        normal: &mut N,
        verbosity: &Verbosity,
    ) -> Result<Self, Error> {
        Self::new(DeviceKind::Node, cfg, 0.0, normal, verbosity)
    }

    /// Builds a source [DeviceCollection], firing every `shot_interval` seconds.
    pub fn sources<N: NormalSource>(
        cfg: &DeviceConfig,
        shot_interval: f64,
        normal: &mut N,
        verbosity: &Verbosity,
    ) -> Result<Self, Error> {
        Self::new(DeviceKind::Source, cfg, shot_interval, normal, verbosity)
    }

    /// Builds a pinger [DeviceCollection]
    pub fn pingers<N: NormalSource>(
        cfg: &DeviceConfig,
        normal: &mut N,
        verbosity: &Verbosity,
    ) -> Result<Self, Error> {
        Self::new(DeviceKind::Pinger, cfg, 0.0, normal, verbosity)
    }

    pub fn kind(&self) -> DeviceKind {
        self.parameters.kind()
    }

    pub fn parameters(&self) -> &GridParameters {
        &self.parameters
    }

    pub fn layout(&self) -> &Grid<GridCell> {
        &self.layout
    }

    pub(crate) fn layout_mut(&mut self) -> &mut Grid<GridCell> {
        &mut self.layout
    }

    pub fn shots(&self) -> Option<&ShotSchedule> {
        self.shots.as_ref()
    }

    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Positions in desired [StateKind], in row-major order.
    pub fn positions(&self, state: StateKind) -> Vec<Vector3<f64>> {
        self.layout
            .values()
            .map(|cell| cell.position.get(state))
            .collect()
    }

    /// Drift coefficients in desired [StateKind], in row-major order.
    pub fn drifts(&self, state: StateKind) -> Vec<Vector3<f64>> {
        self.layout
            .values()
            .map(|cell| cell.drift.get(state))
            .collect()
    }

    /// Exports a [LayoutSnapshot] of the current state of this collection.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let as_tuple = |v: Vector3<f64>| (v[0], v[1], v[2]);
        LayoutSnapshot {
            kind: self.kind(),
            extents: self.parameters.extents(),
            numbers: self
                .parameters
                .indices()
                .map(|(il, xl)| self.parameters.device_number(il, xl))
                .collect(),
            nominal: self
                .positions(StateKind::Nominal)
                .into_iter()
                .map(as_tuple)
                .collect(),
            actual: self
                .positions(StateKind::Actual)
                .into_iter()
                .map(as_tuple)
                .collect(),
            estimated: self
                .positions(StateKind::Estimated)
                .into_iter()
                .map(as_tuple)
                .collect(),
            displacement: self
                .layout
                .values()
                .map(|cell| as_tuple(cell.displacement()))
                .collect(),
        }
    }
}

/// Plain arrays of one [DeviceCollection], in row-major order,
/// for plotting nominal versus actual versus estimated positions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LayoutSnapshot {
    /// [DeviceKind] of the collection
    pub kind: DeviceKind,
    /// Number of (inlines, crosslines)
    pub extents: (usize, usize),
    /// Device numbers
    pub numbers: Vec<usize>,
    /// Nominal positions
    pub nominal: Vec<(f64, f64, f64)>,
    /// Actual positions
    pub actual: Vec<(f64, f64, f64)>,
    /// Estimated positions
    pub estimated: Vec<(f64, f64, f64)>,
    /// Actual minus nominal positions
    pub displacement: Vec<(f64, f64, f64)>,
}
