use nalgebra::{DMatrix, DVector, Vector3};

use crate::{
    constants::{DRIFT_DIM, SPACE_DIM},
    device::DeviceCollection,
    inversion::NodeFailure,
    prelude::Error,
};

/// Evaluates the clock drift polynomial `d0 + d1.t + d2.t²` (Horner scheme).
pub fn drift_polynomial(coefficients: &Vector3<f64>, t: f64) -> f64 {
    (coefficients[2] * t + coefficients[1]) * t + coefficients[0]
}

/// One travel time observation: a source position and its firing time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shot {
    /// (il, xl) of the source
    pub index: (usize, usize),
    /// Actual source position
    pub position: Vector3<f64>,
    /// Firing time
    pub time: f64,
}

/// Modeled travel times and forward operator of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimes {
    /// Modeled travel time, one row per source
    pub time: DVector<f64>,
    /// Forward operator: one row per source, one column per unknown.
    /// Rows hold the negative gradient of the modeled travel time
    /// with respect to the node position (then drift coefficients).
    pub forward: DMatrix<f64>,
}

/// [ForwardModel] links node unknowns to travel times, for a frozen
/// set of sources. It is shared (read only) by all node inversions.
#[derive(Debug, Clone)]
pub struct ForwardModel {
    shots: Vec<Shot>,
    velocity: f64,
    drift: bool,
    min_distance: f64,
    /// Drift columns do not depend on the node estimate
    drift_columns: DMatrix<f64>,
}

impl ForwardModel {
    /// Builds a new [ForwardModel].
    /// ## Input
    /// - sources: source [DeviceCollection], with [crate::prelude::ShotSchedule]
    /// - velocity: sound velocity (m.s⁻¹)
    /// - drift: true when drift coefficients are unknowns too
    /// - min_distance: degenerate distance floor (m)
    pub fn new(
        sources: &DeviceCollection,
        velocity: f64,
        drift: bool,
        min_distance: f64,
    ) -> Result<Self, Error> {
        let schedule = sources
            .shots()
            .ok_or(Error::MissingShotSchedule(sources.kind()))?;

        let shots = sources
            .layout()
            .iter()
            .map(|(index, cell)| Shot {
                index,
                position: cell.position.actual(),
                time: schedule.times()[index],
            })
            .collect::<Vec<_>>();

        let drift_columns = DMatrix::from_fn(shots.len(), DRIFT_DIM, |row, col| {
            -shots[row].time.powi(col as i32)
        });

        Ok(Self {
            shots,
            velocity,
            drift,
            min_distance,
            drift_columns,
        })
    }

    /// Number of travel times per node
    pub fn observations(&self) -> usize {
        self.shots.len()
    }

    /// Number of unknowns per node
    pub fn unknowns(&self) -> usize {
        if self.drift {
            SPACE_DIM + DRIFT_DIM
        } else {
            SPACE_DIM
        }
    }

    /// True when drift coefficients are resolved
    pub fn drift(&self) -> bool {
        self.drift
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Travel time from `shot` to a node at `position`, with clock `drift`.
    fn travel_time(&self, shot: &Shot, distance: f64, drift: &Vector3<f64>) -> f64 {
        let mut time = distance / self.velocity;
        if self.drift {
            time += drift_polynomial(drift, shot.time);
        }
        time
    }

    /// Travel times observed by a node at its actual `position`, with its actual `drift`.
    pub fn observed(&self, position: &Vector3<f64>, drift: &Vector3<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.shots.len(),
            self.shots.iter().map(|shot| {
                let distance = (shot.position - position).norm();
                self.travel_time(shot, distance, drift)
            }),
        )
    }

    /// Modeled [TravelTimes] for a node estimated at `position`, with estimated `drift`.
    /// Fails on the first source closer than the degenerate distance floor.
    pub fn evaluate(
        &self,
        position: &Vector3<f64>,
        drift: &Vector3<f64>,
    ) -> Result<TravelTimes, NodeFailure> {
        let (nrows, ncols) = (self.shots.len(), self.unknowns());

        let mut time = DVector::<f64>::zeros(nrows);
        let mut forward = DMatrix::<f64>::zeros(nrows, ncols);

        for (row, shot) in self.shots.iter().enumerate() {
            let delta = shot.position - position;
            let distance = delta.norm();

            if !(distance >= self.min_distance) {
                return Err(NodeFailure::NumericDegeneracy {
                    source_index: shot.index,
                    distance_m: distance,
                });
            }

            time[row] = self.travel_time(shot, distance, drift);

            for col in 0..SPACE_DIM {
                forward[(row, col)] = delta[col] / (distance * self.velocity);
            }

            if self.drift {
                for col in 0..DRIFT_DIM {
                    forward[(row, SPACE_DIM + col)] = self.drift_columns[(row, col)];
                }
            }
        }

        Ok(TravelTimes { time, forward })
    }
}

#[cfg(test)]
mod test {
    use super::{drift_polynomial, ForwardModel};
    use crate::{
        cfg::{Config, Verbosity},
        device::DeviceCollection,
        inversion::NodeFailure,
        perturbation::Moment,
        random::RandomStream,
    };
    use nalgebra::Vector3;
    use rstest::*;

    #[fixture]
    fn sources() -> DeviceCollection {
        let cfg = Config::unperturbed();
        let mut stream = RandomStream::from_seed(0);
        DeviceCollection::sources(&cfg.sources, 20.0, &mut stream, &Verbosity::quiet()).unwrap()
    }

    #[test]
    fn horner() {
        let d = Vector3::new(1.0E-3, 2.0E-4, 3.0E-5);
        let t = 40.0;
        let expected = 1.0E-3 + 2.0E-4 * t + 3.0E-5 * t * t;
        assert!((drift_polynomial(&d, t) - expected).abs() < 1.0E-15);
        assert_eq!(drift_polynomial(&d, 0.0), 1.0E-3);
    }

    #[rstest]
    fn dimensions(sources: DeviceCollection) {
        let model = ForwardModel::new(&sources, 1500.0, false, 1.0E-6).unwrap();
        assert_eq!(model.observations(), 9);
        assert_eq!(model.unknowns(), 3);

        let model = ForwardModel::new(&sources, 1500.0, true, 1.0E-6).unwrap();
        assert_eq!(model.unknowns(), 6);

        let tt = model
            .evaluate(&Vector3::new(50.0, 50.0, 1000.0), &Vector3::zeros())
            .unwrap();
        assert_eq!(tt.time.len(), 9);
        assert_eq!(tt.forward.shape(), (9, 6));

        // drift columns: -[1, t, t²], t = 20 * row
        for row in 0..9 {
            let t = 20.0 * row as f64;
            assert_eq!(tt.forward[(row, 3)], -1.0);
            assert_eq!(tt.forward[(row, 4)], -t);
            assert_eq!(tt.forward[(row, 5)], -t * t);
        }
    }

    #[rstest]
    fn observed_matches_modeled_at_actual_state(sources: DeviceCollection) {
        let model = ForwardModel::new(&sources, 1500.0, true, 1.0E-6).unwrap();
        let position = Vector3::new(60.0, 45.0, 1002.0);
        let drift = Vector3::new(1.0E-3, -1.0E-4, 1.0E-6);

        let observed = model.observed(&position, &drift);
        let modeled = model.evaluate(&position, &drift).unwrap();
        assert!((observed - modeled.time).amax() < 1.0E-15);
    }

    #[test]
    fn source_without_schedule_is_rejected() {
        let cfg = Config::unperturbed();
        let mut stream = RandomStream::from_seed(0);
        let nodes = DeviceCollection::nodes(&cfg.nodes, &mut stream, &Verbosity::quiet()).unwrap();
        assert!(ForwardModel::new(&nodes, 1500.0, false, 1.0E-6).is_err());
    }

    #[rstest]
    fn coincident_source_is_degenerate(sources: DeviceCollection) {
        let model = ForwardModel::new(&sources, 1500.0, false, 1.0E-6).unwrap();

        // source (1, 2) sits at (100, 200, 0)
        match model.evaluate(&Vector3::new(100.0, 200.0, 0.0), &Vector3::zeros()) {
            Err(NodeFailure::NumericDegeneracy {
                source_index,
                distance_m,
            }) => {
                assert_eq!(source_index, (1, 2));
                assert_eq!(distance_m, 0.0);
            },
            other => panic!("expected degeneracy, got {:?}", other),
        }

        // below the floor is degenerate too
        assert!(model
            .evaluate(&Vector3::new(100.0, 200.0, 1.0E-7), &Vector3::zeros())
            .is_err());
    }

    #[test]
    fn perturbed_sources_use_actual_positions() {
        let cfg = Config::unperturbed();
        let sources_cfg = cfg.sources.with_location(Moment::fixed((1.0, 0.0, 0.0)));
        let mut stream = RandomStream::from_seed(0);
        let sources =
            DeviceCollection::sources(&sources_cfg, 20.0, &mut stream, &Verbosity::quiet())
                .unwrap();

        let model = ForwardModel::new(&sources, 1000.0, false, 1.0E-6).unwrap();

        // source (0, 0) actually sits at (1, 0, 0)
        let observed = model.observed(&Vector3::new(1.0, 0.0, 10.0), &Vector3::zeros());
        assert!((observed[0] - 0.01).abs() < 1.0E-15);
    }
}
