mod jacobian;
mod rank;

use log::LevelFilter;
use std::sync::Once;

use crate::prelude::{
    Config, DeviceCollection, DeviceConfig, InversionOpts, Moment, RandomStream, Verbosity,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// 3x3 sources, 100m apart, at the surface
pub fn surface_sources() -> DeviceConfig {
    DeviceConfig {
        origin: (0.0, 0.0, 0.0),
        spacing: (100.0, 100.0),
        extents: (3, 3),
        location: Moment::default(),
        drift: Moment::default(),
    }
}

/// Single node at (50, 50, 1000), actually displaced by `offset`
pub fn single_node(offset: (f64, f64, f64)) -> DeviceConfig {
    DeviceConfig {
        origin: (50.0, 50.0, 1000.0),
        spacing: (50.0, 50.0),
        extents: (1, 1),
        location: Moment::fixed(offset),
        drift: Moment::default(),
    }
}

/// Inversion options of the reference scenario
pub fn reference_opts(drift: bool) -> InversionOpts {
    InversionOpts {
        drift,
        max_residual_s: 1.0E-6,
        max_iter: 123,
        ..Default::default()
    }
}

/// Builds (nodes, sources) for given [Config], from a seeded stream.
pub fn build_devices(cfg: &Config, seed: u64) -> (DeviceCollection, DeviceCollection) {
    let mut stream = RandomStream::from_seed(seed);
    let verbosity = Verbosity::quiet();
    let nodes = DeviceCollection::nodes(&cfg.nodes, &mut stream, &verbosity)
        .unwrap_or_else(|e| panic!("failed to build nodes: {}", e));
    let sources =
        DeviceCollection::sources(&cfg.sources, cfg.shot_interval_s, &mut stream, &verbosity)
            .unwrap_or_else(|e| panic!("failed to build sources: {}", e));
    (nodes, sources)
}
