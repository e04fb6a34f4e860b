//! Gauss-Newton travel time inversion
use log::{debug, info, warn};
use nalgebra::Vector3;

use crate::{
    cfg::{Config, InversionOpts, Verbosity},
    device::DeviceCollection,
    grid::GridCell,
    prelude::Error,
};

mod forward;
mod normal;
mod report;

pub use forward::{drift_polynomial, ForwardModel, TravelTimes};
pub use normal::NormalEquations;
pub use report::{InversionReport, NodeFailure, NodeReport, NodeState};

/// Refined state of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSolution {
    /// Final [NodeState]
    pub state: NodeState,
    /// Estimated position, after the last update
    pub position: Vector3<f64>,
    /// Estimated drift coefficients, after the last update
    pub drift: Vector3<f64>,
    /// Number of updates applied
    pub iterations: usize,
    /// Largest absolute residual (s) of every evaluation
    pub residuals: Vec<f64>,
}

/// [Inversion] resolves the actual position (and optionally clock drift)
/// of every node, from the travel times of all sources.
#[derive(Debug, Clone, Copy)]
pub struct Inversion {
    /// [InversionOpts]
    pub opts: InversionOpts,
    /// Sound velocity (m.s⁻¹)
    pub velocity: f64,
    /// [Verbosity]
    pub verbosity: Verbosity,
}

impl Inversion {
    /// Creates a new [Inversion] from the run [Config]
    pub fn new(cfg: &Config) -> Self {
        Self {
            opts: cfg.inversion,
            velocity: cfg.velocity_m_s,
            verbosity: cfg.verbosity,
        }
    }

    /// Builds the [ForwardModel] of this [Inversion] for given sources.
    pub fn forward_model(&self, sources: &DeviceCollection) -> Result<ForwardModel, Error> {
        ForwardModel::new(
            sources,
            self.velocity,
            self.opts.drift,
            self.opts.min_distance_m,
        )
    }

    /// Inverts every node, one cell at a time, and writes the final
    /// estimates back into the node grid. Per node numerical issues do not
    /// interrupt the run, they are gathered in the returned [InversionReport].
    /// ## Input
    /// - sources: source [DeviceCollection], read only
    /// - nodes: node [DeviceCollection], only the estimates are updated
    /// - pingers: optional pinger [DeviceCollection]. Pingers do not
    ///   participate in the travel time equations.
    pub fn run(
        &self,
        sources: &DeviceCollection,
        nodes: &mut DeviceCollection,
        pingers: Option<&DeviceCollection>,
    ) -> Result<InversionReport, Error> {
        if !nodes.kind().is_invertible() {
            return Err(Error::NotInvertible(nodes.kind()));
        }

        let model = self.forward_model(sources)?;

        if let Some(pingers) = pingers {
            if !pingers.kind().participates_in_inversion() {
                debug!(
                    "{} {}s do not contribute to the travel times",
                    pingers.len(),
                    pingers.kind()
                );
            }
        }

        let parameters = *nodes.parameters();
        let mut report = InversionReport::default();

        for (index, cell) in nodes.layout_mut().iter_mut() {
            let number = parameters.device_number(index.0, index.1);
            let solution = self.invert_node(&model, cell, number);

            cell.position.set_estimated(solution.position);
            cell.drift.set_estimated(solution.drift);

            match &solution.state {
                NodeState::Converged => {
                    debug!(
                        "node {} converged after {} iteration(s)",
                        number, solution.iterations
                    );
                },
                NodeState::NonConvergence => {
                    warn!(
                        "node {} - emergency break after {} iterations (max|res|={:.3E}s)",
                        number,
                        solution.iterations,
                        solution.residuals.last().copied().unwrap_or(f64::NAN),
                    );
                },
                NodeState::Failed(e) => {
                    warn!("node {} - inversion failure: {}", number, e);
                },
                _ => {},
            }

            report.nodes.push(NodeReport {
                index,
                number,
                iterations: solution.iterations,
                position: solution.position,
                drift: solution.drift,
                position_error_m: cell.position_error(),
                residuals: solution.residuals,
                state: solution.state,
            });
        }

        info!("inversion completed - {}", report);
        Ok(report)
    }

    /// Inverts a single node. This only reads `cell` and the shared
    /// [ForwardModel]: nodes may be processed in any order.
    /// The estimate starts from the current estimated state of `cell`.
    pub fn invert_node(&self, model: &ForwardModel, cell: &GridCell, number: usize) -> NodeSolution {
        let observed = model.observed(&cell.position.actual(), &cell.drift.actual());

        let mut solution = NodeSolution {
            state: NodeState::Initialized,
            position: cell.position.estimated(),
            drift: cell.drift.estimated(),
            iterations: 0,
            residuals: Vec::with_capacity(8),
        };

        if model.observations() < model.unknowns() {
            solution.state = NodeState::Failed(NodeFailure::Underdetermined {
                observations: model.observations(),
                unknowns: model.unknowns(),
            });
            return solution;
        }

        solution.state = NodeState::Iterating;

        while !solution.state.is_terminal() {
            let modeled = match model.evaluate(&solution.position, &solution.drift) {
                Ok(modeled) => modeled,
                Err(e) => {
                    solution.state = NodeState::Failed(e);
                    break;
                },
            };

            let residual = &modeled.time - &observed;
            let max_residual = residual.amax();
            solution.residuals.push(max_residual);

            if self.verbosity.iterations {
                let est = solution.position;
                debug!(
                    "node {} iter={} max|res|={:.3E}s - est.: {:8.3}, {:8.3}, {:8.3}",
                    number, solution.iterations, max_residual, est[0], est[1], est[2],
                );
            }

            if !max_residual.is_finite() {
                solution.state = NodeState::Failed(NodeFailure::NonFiniteResidual);
            } else if max_residual <= self.opts.max_residual_s {
                solution.state = NodeState::Converged;
            } else if solution.iterations >= self.opts.max_iter {
                solution.state = NodeState::NonConvergence;
            } else {
                let normal = NormalEquations::new(&modeled.forward, &residual);
                match normal.solve(self.opts.max_condition) {
                    Ok(dx) => {
                        solution.position += Vector3::new(dx[0], dx[1], dx[2]);
                        if model.drift() {
                            solution.drift += Vector3::new(dx[3], dx[4], dx[5]);
                        }
                        solution.iterations += 1;
                    },
                    Err(e) => {
                        solution.state = NodeState::Failed(e);
                    },
                }
            }
        }

        solution
    }
}
