use nalgebra::Vector3;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Reason why the inversion of one node failed.
/// A failure is isolated to its node: the remaining nodes are still processed.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum NodeFailure {
    /// Source to node distance collapsed below the numerical floor:
    /// travel time derivatives are undefined.
    #[error("source {source_index:?}: degenerate distance {distance_m:.3E}m")]
    NumericDegeneracy {
        source_index: (usize, usize),
        distance_m: f64,
    },

    /// Fewer travel times than unknowns.
    #[error("{observations} travel times for {unknowns} unknowns")]
    Underdetermined {
        observations: usize,
        unknowns: usize,
    },

    /// Source geometry does not constrain all unknowns.
    #[error("singular normal matrix")]
    SingularMatrix,

    /// Source geometry barely constrains one of the unknowns.
    #[error("ill conditioned normal matrix (cond={condition:.3E})")]
    IllConditioned { condition: f64 },

    /// Residuals turned into NaN or infinity.
    #[error("non finite travel time residual")]
    NonFiniteResidual,
}

/// State of one node inversion:
/// `Initialized -> Iterating -> {Converged | NonConvergence | Failed}`
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum NodeState {
    /// Estimate set to its nominal value, nothing computed yet
    #[default]
    Initialized,
    /// Gauss-Newton iterations in progress
    Iterating,
    /// Largest residual dropped below the threshold
    Converged,
    /// Emergency break: iteration cap reached before convergence.
    /// The last estimate is retained.
    NonConvergence,
    /// Numerical failure. The last estimate is retained.
    Failed(NodeFailure),
}

impl NodeState {
    /// True once the inversion of this node has ended
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Initialized | Self::Iterating)
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Iterating => write!(f, "iterating"),
            Self::Converged => write!(f, "converged"),
            Self::NonConvergence => write!(f, "non convergence"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Outcome of one node inversion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeReport {
    /// (il, xl) of the node
    pub index: (usize, usize),
    /// Device number
    pub number: usize,
    /// Final [NodeState]
    pub state: NodeState,
    /// Number of updates applied
    pub iterations: usize,
    /// Largest absolute travel time residual (s), one entry per evaluation
    pub residuals: Vec<f64>,
    /// Final estimated position
    pub position: Vector3<f64>,
    /// Final estimated drift coefficients
    pub drift: Vector3<f64>,
    /// Distance between estimated and actual positions (m)
    pub position_error_m: f64,
}

impl NodeReport {
    /// Last evaluated largest residual
    pub fn max_residual(&self) -> Option<f64> {
        self.residuals.last().copied()
    }
}

/// Per-run report: one [NodeReport] per node, in row-major order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct InversionReport {
    pub nodes: Vec<NodeReport>,
}

impl InversionReport {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// [NodeReport] of node (il, xl)
    pub fn node(&self, il: usize, xl: usize) -> Option<&NodeReport> {
        self.nodes.iter().find(|node| node.index == (il, xl))
    }

    /// Converged nodes
    pub fn converged(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes.iter().filter(|node| node.state.is_converged())
    }

    /// Nodes stopped by the emergency break
    pub fn non_converged(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes
            .iter()
            .filter(|node| node.state == NodeState::NonConvergence)
    }

    /// Failed nodes
    pub fn failed(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes.iter().filter(|node| node.state.is_failed())
    }

    /// True when every node converged
    pub fn all_converged(&self) -> bool {
        self.nodes.iter().all(|node| node.state.is_converged())
    }

    /// Largest position error among converged nodes (m)
    pub fn max_position_error_m(&self) -> Option<f64> {
        self.converged()
            .map(|node| node.position_error_m)
            .reduce(f64::max)
    }
}

impl std::fmt::Display for InversionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes: {} converged, {} non converged, {} failed",
            self.len(),
            self.converged().count(),
            self.non_converged().count(),
            self.failed().count(),
        )
    }
}
