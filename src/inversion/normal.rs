use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::inversion::NodeFailure;

/// Normal equations `(FᵗF).dx = Fᵗ.r` of one Gauss-Newton iteration.
///
/// Unknowns live on very different scales (meters versus clock drift
/// coefficients, up to t² for the second order), so the normal matrix
/// is symmetrically scaled to a unit diagonal before its conditioning
/// is evaluated and the system is solved.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    /// Scaled normal matrix S.FᵗF.S
    matrix: DMatrix<f64>,
    /// Scaled right hand side S.Fᵗr
    rhs: DVector<f64>,
    /// Diagonal of S
    scale: DVector<f64>,
    /// One unknown is not constrained at all
    null_column: bool,
}

impl NormalEquations {
    /// Forms the [NormalEquations] from forward operator `forward` and `residual` vector.
    pub fn new(forward: &DMatrix<f64>, residual: &DVector<f64>) -> Self {
        let ft = forward.transpose();
        let ft_f = &ft * forward;
        let ft_r = &ft * residual;

        let n = ft_f.nrows();
        let mut scale = DVector::<f64>::zeros(n);
        let mut null_column = false;

        for i in 0..n {
            let diag = ft_f[(i, i)];
            if diag > 0.0 && diag.is_finite() {
                scale[i] = 1.0 / diag.sqrt();
            } else {
                null_column = true;
            }
        }

        let matrix = DMatrix::from_fn(n, n, |i, j| ft_f[(i, j)] * scale[i] * scale[j]);
        let rhs = DVector::from_fn(n, |i, _| ft_r[i] * scale[i]);

        Self {
            matrix,
            rhs,
            scale,
            null_column,
        }
    }

    /// Number of unknowns
    pub fn dimension(&self) -> usize {
        self.scale.len()
    }

    /// Condition number of the scaled normal matrix.
    /// Infinite when the matrix is singular.
    pub fn condition_number(&self) -> f64 {
        if self.null_column {
            return f64::INFINITY;
        }

        let eigen = SymmetricEigen::new(self.matrix.clone());
        let max = eigen.eigenvalues.max();
        let min = eigen.eigenvalues.min();

        if !(min > 0.0) || !max.is_finite() {
            f64::INFINITY
        } else {
            max / min
        }
    }

    /// Solves for the update, rejecting singular systems and systems
    /// whose condition number exceeds `max_condition`.
    pub fn solve(&self, max_condition: f64) -> Result<DVector<f64>, NodeFailure> {
        let condition = self.condition_number();

        if !condition.is_finite() || condition * f64::EPSILON >= 1.0 {
            return Err(NodeFailure::SingularMatrix);
        }

        if condition > max_condition {
            return Err(NodeFailure::IllConditioned { condition });
        }

        let cholesky = self
            .matrix
            .clone()
            .cholesky()
            .ok_or(NodeFailure::SingularMatrix)?;

        let y = cholesky.solve(&self.rhs);

        Ok(y.component_mul(&self.scale))
    }
}
