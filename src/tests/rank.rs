use nalgebra::DVector;
use rstest::*;

use crate::{
    constants::MAX_CONDITION_NUMBER,
    prelude::{
        DeviceCollection, DeviceConfig, ForwardModel, Moment, NodeFailure, NormalEquations,
        RandomStream, Vector3, Verbosity,
    },
    tests::{init_logger, surface_sources},
};

/// Sources randomly scattered around a regular grid
fn scattered_sources(extents: (usize, usize), seed: u64) -> DeviceCollection {
    let cfg = DeviceConfig {
        origin: (0.0, 0.0, 0.0),
        spacing: (100.0, 100.0),
        extents,
        location: Moment::centered((200.0, 200.0, 200.0)),
        drift: Moment::default(),
    };

    let mut stream = RandomStream::from_seed(seed);
    DeviceCollection::sources(&cfg, 20.0, &mut stream, &Verbosity::quiet()).unwrap()
}

fn normal_equations(sources: &DeviceCollection, drift: bool, node: Vector3<f64>) -> NormalEquations {
    let model = ForwardModel::new(sources, 1500.0, drift, 1.0E-6).unwrap();
    let modeled = model.evaluate(&node, &Vector3::zeros()).unwrap();
    let residual = DVector::zeros(model.observations());
    NormalEquations::new(&modeled.forward, &residual)
}

#[rstest]
#[case(false, (2, 3))]
#[case(true, (3, 4))]
fn scattered_geometries_are_solvable(#[case] drift: bool, #[case] extents: (usize, usize)) {
    init_logger();

    let node = Vector3::new(100.0, 100.0, 1000.0);

    for seed in 0..50 {
        let sources = scattered_sources(extents, seed);
        let normal = normal_equations(&sources, drift, node);

        assert_eq!(normal.dimension(), if drift { 6 } else { 3 });

        let condition = normal.condition_number();
        assert!(
            condition.is_finite() && condition < MAX_CONDITION_NUMBER,
            "seed={}: cond={:.3E}",
            seed,
            condition
        );

        // null residual: null update
        let dx = normal.solve(MAX_CONDITION_NUMBER).unwrap();
        assert!(dx.amax() < 1.0E-9, "seed={}: dx={}", seed, dx);
    }
}

#[test]
fn node_in_source_plane_is_singular() {
    init_logger();

    let sources = DeviceCollection::sources(
        &surface_sources(),
        20.0,
        &mut RandomStream::from_seed(0),
        &Verbosity::quiet(),
    )
    .unwrap();

    let normal = normal_equations(&sources, false, Vector3::new(50.0, 50.0, 0.0));
    assert_eq!(normal.condition_number(), f64::INFINITY);
    assert_eq!(
        normal.solve(MAX_CONDITION_NUMBER),
        Err(NodeFailure::SingularMatrix)
    );

    // any depth resolves the ambiguity
    let normal = normal_equations(&sources, false, Vector3::new(50.0, 50.0, 100.0));
    assert!(normal.solve(MAX_CONDITION_NUMBER).is_ok());
}
