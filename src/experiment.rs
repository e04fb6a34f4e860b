//! Synthetic experiment
use log::info;

use crate::{
    cfg::Config,
    device::DeviceCollection,
    inversion::{Inversion, InversionReport},
    prelude::Error,
    random::{NormalSource, RandomStream},
};

/// [Experiment] gathers the three device collections of one synthetic run.
/// All layouts are built (and frozen) before the inversion starts.
pub struct Experiment {
    cfg: Config,
    nodes: DeviceCollection,
    sources: DeviceCollection,
    pingers: DeviceCollection,
}

impl Experiment {
    /// Builds a new [Experiment]: validates the [Config], then draws all
    /// layouts from a single [RandomStream], seeded from [Config::seed].
    pub fn new(cfg: &Config) -> Result<Self, Error> {
        let mut stream = RandomStream::new(cfg.seed);
        Self::with_normal_source(cfg, &mut stream)
    }

    /// Builds a new [Experiment], drawing all layouts from given [NormalSource].
    /// Nodes are drawn first, then sources, then pingers.
    pub fn with_normal_source<N: NormalSource>(cfg: &Config, normal: &mut N) -> Result<Self, Error> {
        cfg.validate()?;

        let nodes = DeviceCollection::nodes(&cfg.nodes, normal, &cfg.verbosity)?;
        let sources =
            DeviceCollection::sources(&cfg.sources, cfg.shot_interval_s, normal, &cfg.verbosity)?;
        let pingers = DeviceCollection::pingers(&cfg.pingers, normal, &cfg.verbosity)?;

        info!(
            "{} nodes, {} sources, {} pingers (drift inversion: {})",
            nodes.len(),
            sources.len(),
            pingers.len(),
            cfg.inversion.drift,
        );

        Ok(Self {
            cfg: cfg.clone(),
            nodes,
            sources,
            pingers,
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn nodes(&self) -> &DeviceCollection {
        &self.nodes
    }

    pub fn sources(&self) -> &DeviceCollection {
        &self.sources
    }

    pub fn pingers(&self) -> &DeviceCollection {
        &self.pingers
    }

    /// Inverts all nodes once. Node estimates are updated in place.
    pub fn run(&mut self) -> Result<InversionReport, Error> {
        let inversion = Inversion::new(&self.cfg);
        inversion.run(&self.sources, &mut self.nodes, Some(&self.pingers))
    }
}
