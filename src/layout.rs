//! Device layouts
use log::debug;
use nalgebra::Vector3;

use crate::{
    cfg::Verbosity,
    grid::{Grid, GridCell, GridParameters, TripleState},
    perturbation::{Moment, Perturbation},
    random::NormalSource,
};

/// [Layout] builds the complete grid of one device collection.
pub struct Layout;

impl Layout {
    /// Builds the [Grid] of [GridCell]s described by `parameters`.
    /// ## Input
    /// - parameters: validated [GridParameters]
    /// - location: spatial [Moment], applied to the nominal position
    /// - drift: clock drift [Moment], applied to null nominal coefficients
    /// - perturbation: [Perturbation] generator, sampled once per cell
    ///   (location first, drift second), in row-major order
    /// - verbosity: [Verbosity] of the debug traces
    pub fn build<N: NormalSource>(
        parameters: &GridParameters,
        location: &Moment,
        drift: &Moment,
        perturbation: &mut Perturbation<'_, N>,
        verbosity: &Verbosity,
    ) -> Grid<GridCell> {
        let kind = parameters.kind();

        Grid::from_fn(parameters.extents(), |il, xl| {
            let nominal = parameters.nominal_position(il, xl);
            let scatter = perturbation.sample3(location);
            let position = TripleState::perturbed(nominal, scatter);

            let coefficients = perturbation.sample3(drift);
            let drift = TripleState::perturbed(Vector3::zeros(), coefficients);

            if verbosity.locations {
                let (nom, act) = (position.nominal(), position.actual());
                debug!(
                    "{} ({}, {}) no {} - nom.: {:8.3}, {:8.3}, {:8.3} - act.: {:8.3}, {:8.3}, {:8.3}",
                    kind,
                    il,
                    xl,
                    parameters.device_number(il, xl),
                    nom[0],
                    nom[1],
                    nom[2],
                    act[0],
                    act[1],
                    act[2],
                );
            }

            if verbosity.drift {
                let act = drift.actual();
                debug!(
                    "{} ({}, {}) drift - act.: {:.3E}, {:.3E}, {:.3E}",
                    kind, il, xl, act[0], act[1], act[2],
                );
            }

            GridCell { position, drift }
        })
    }
}

#[cfg(test)]
mod test {
    use super::Layout;
    use crate::{
        cfg::Verbosity,
        grid::GridParameters,
        perturbation::{Moment, Perturbation},
        prelude::DeviceKind,
        random::RandomStream,
    };
    use nalgebra::Vector3;

    fn parameters() -> GridParameters {
        GridParameters::new(DeviceKind::Node, (50.0, 50.0, 1000.0), (50.0, 50.0), (3, 2)).unwrap()
    }

    #[test]
    fn unperturbed_layout() {
        let mut stream = RandomStream::from_seed(0);
        let mut perturbation = Perturbation::new(&mut stream);

        let grid = Layout::build(
            &parameters(),
            &Moment::default(),
            &Moment::default(),
            &mut perturbation,
            &Verbosity::default(),
        );

        assert_eq!(grid.extents(), (3, 2));
        for ((il, xl), cell) in grid.iter() {
            let expected = Vector3::new(50.0 + 50.0 * il as f64, 50.0 + 50.0 * xl as f64, 1000.0);
            assert_eq!(cell.position.nominal(), expected);
            assert_eq!(cell.position.actual(), expected);
            assert_eq!(cell.position.estimated(), expected);
            assert_eq!(cell.drift.actual(), Vector3::zeros());
            assert_eq!(cell.drift.estimated(), Vector3::zeros());
        }
    }

    #[test]
    fn perturbed_layout() {
        let mut stream = RandomStream::from_seed(1234);
        let mut perturbation = Perturbation::new(&mut stream);

        let location = Moment::centered((10.0, 10.0, 5.0));
        let drift = Moment::centered((1.0E-3, 1.0E-4, 1.0E-5));

        let grid = Layout::build(
            &parameters(),
            &location,
            &drift,
            &mut perturbation,
            &Verbosity::default(),
        );

        for (_, cell) in grid.iter() {
            // estimate starts from the undisturbed nominal values
            assert_eq!(cell.position.estimated(), cell.position.nominal());
            assert_eq!(cell.drift.nominal(), Vector3::zeros());
            assert_eq!(cell.drift.estimated(), Vector3::zeros());
            assert_ne!(cell.position.actual(), cell.position.nominal());
            assert_ne!(cell.drift.actual(), Vector3::zeros());
            assert!(cell.displacement().norm() < 100.0);
        }
    }

    #[test]
    fn seeded_layouts_are_reproducible() {
        let location = Moment::centered((10.0, 10.0, 5.0));
        let drift = Moment::centered((1.0E-3, 1.0E-4, 1.0E-5));

        let mut grids = Vec::new();
        for _ in 0..2 {
            let mut stream = RandomStream::from_seed(99);
            let mut perturbation = Perturbation::new(&mut stream);
            grids.push(Layout::build(
                &parameters(),
                &location,
                &drift,
                &mut perturbation,
                &Verbosity::default(),
            ));
        }
        assert_eq!(grids[0], grids[1]);
    }
}
