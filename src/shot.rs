//! Source firing times
use crate::grid::{Grid, GridParameters};

/// Firing time of every source cell.
///
/// Sources fire one after the other, every `interval` seconds, starting at t=0.
/// The firing order is the row-major order of the source grid: inline-major,
/// crossline fastest. Cell (il, xl) fires at `(il * max_crossline + xl) * interval`.
/// This is also the order in which sources form the travel time vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotSchedule {
    interval: f64,
    times: Grid<f64>,
}

impl ShotSchedule {
    /// Builds the [ShotSchedule] of a source grid.
    pub fn build(parameters: &GridParameters, interval: f64) -> Self {
        let times = Grid::from_fn(parameters.extents(), |il, xl| {
            parameters.linear_index(il, xl) as f64 * interval
        });
        Self { interval, times }
    }

    /// Nominal interval between two shots
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Firing time of source (il, xl)
    pub fn time(&self, il: usize, xl: usize) -> Option<f64> {
        self.times.get(il, xl).copied()
    }

    /// Firing times as [Grid]
    pub fn times(&self) -> &Grid<f64> {
        &self.times
    }

    /// Firing times in firing order
    pub fn sequence(&self) -> Vec<f64> {
        self.times.values().copied().collect()
    }
}

#[cfg(test)]
mod test {
    use super::ShotSchedule;
    use crate::{grid::GridParameters, prelude::DeviceKind};
    use rstest::*;

    #[rstest]
    #[case((3, 3), 20.0)]
    #[case((1, 5), 20.0)]
    #[case((4, 2), 0.5)]
    fn strictly_increasing_linear_sequence(#[case] extents: (usize, usize), #[case] dt: f64) {
        let params =
            GridParameters::new(DeviceKind::Source, (0.0, 0.0, 0.0), (100.0, 100.0), extents)
                .unwrap();

        let schedule = ShotSchedule::build(&params, dt);
        let sequence = schedule.sequence();

        assert_eq!(sequence.len(), extents.0 * extents.1);
        assert_eq!(sequence[0], 0.0);

        for (i, pair) in sequence.windows(2).enumerate() {
            assert!(pair[1] > pair[0], "not increasing at {}", i);
            assert!((pair[1] - pair[0] - dt).abs() < 1.0E-12);
        }
    }

    #[test]
    fn three_by_three_schedule() {
        let params =
            GridParameters::new(DeviceKind::Source, (0.0, 0.0, 0.0), (100.0, 100.0), (3, 3))
                .unwrap();

        let schedule = ShotSchedule::build(&params, 20.0);

        assert_eq!(schedule.interval(), 20.0);
        assert_eq!(schedule.time(0, 0), Some(0.0));
        assert_eq!(schedule.time(0, 1), Some(20.0));
        assert_eq!(schedule.time(0, 2), Some(40.0));
        assert_eq!(schedule.time(1, 0), Some(60.0));
        assert_eq!(schedule.time(2, 2), Some(160.0));
        assert_eq!(schedule.time(3, 0), None);
    }
}
