use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

use crate::{
    prelude::{Config, DeviceCollection, ForwardModel, Moment, RandomStream, Vector3, Verbosity},
    tests::{init_logger, surface_sources},
};

/// Modeled travel time from source `row`, for given unknowns
fn travel_time(model: &ForwardModel, unknowns: &[f64; 6], row: usize) -> f64 {
    let position = Vector3::new(unknowns[0], unknowns[1], unknowns[2]);
    let drift = Vector3::new(unknowns[3], unknowns[4], unknowns[5]);
    let modeled = model.evaluate(&position, &drift).unwrap();
    modeled.time[row]
}

#[rstest]
#[case(false, 10)]
#[case(true, 11)]
#[case(true, 12)]
fn forward_operator_matches_finite_differences(#[case] drift: bool, #[case] seed: u64) {
    init_logger();

    let cfg = Config::default().with_sources(
        surface_sources().with_location(Moment::centered((20.0, 20.0, 10.0))),
    );

    let mut stream = RandomStream::from_seed(seed);
    let sources = DeviceCollection::sources(
        &cfg.sources,
        cfg.shot_interval_s,
        &mut stream,
        &Verbosity::quiet(),
    )
    .unwrap();

    let model = ForwardModel::new(&sources, cfg.velocity_m_s, drift, 1.0E-6).unwrap();
    let mut rng = SmallRng::seed_from_u64(seed);

    for _ in 0..10 {
        let unknowns = [
            rng.random_range(-200.0..400.0),
            rng.random_range(-200.0..400.0),
            rng.random_range(200.0..1500.0),
            rng.random_range(-1.0E-3..1.0E-3),
            rng.random_range(-1.0E-4..1.0E-4),
            rng.random_range(-1.0E-5..1.0E-5),
        ];

        let position = Vector3::new(unknowns[0], unknowns[1], unknowns[2]);
        let coefs = Vector3::new(unknowns[3], unknowns[4], unknowns[5]);
        let modeled = model.evaluate(&position, &coefs).unwrap();

        assert_eq!(modeled.forward.nrows(), model.observations());
        assert_eq!(modeled.forward.ncols(), model.unknowns());

        for col in 0..model.unknowns() {
            let step = if col < 3 { 1.0E-3 } else { 1.0E-7 };

            for row in 0..model.observations() {
                let (mut plus, mut minus) = (unknowns, unknowns);
                plus[col] += step;
                minus[col] -= step;

                let derivative = (travel_time(&model, &plus, row)
                    - travel_time(&model, &minus, row))
                    / (2.0 * step);

                // forward operator holds the negative gradient
                let analytic = modeled.forward[(row, col)];
                let tolerance = 1.0E-9 + 1.0E-6 * analytic.abs();

                assert!(
                    (analytic + derivative).abs() <= tolerance,
                    "({}, {}): {:.6E} versus {:.6E}",
                    row,
                    col,
                    analytic,
                    -derivative
                );
            }
        }
    }
}
