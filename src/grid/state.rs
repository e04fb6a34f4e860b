use nalgebra::Vector3;

/// The three parallel states of every device quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Undisturbed design value
    Nominal,
    /// Ground truth: nominal value plus one random perturbation
    Actual,
    /// Value refined by the inversion
    Estimated,
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(fmt, "nom."),
            Self::Actual => write!(fmt, "act."),
            Self::Estimated => write!(fmt, "est."),
        }
    }
}

/// Nominal, actual and estimated values of one quantity.
/// Nominal and actual are frozen at construction, only
/// the estimate may be updated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripleState<T> {
    nominal: T,
    actual: T,
    estimated: T,
}

impl<T: Copy + std::ops::Add<Output = T>> TripleState<T> {
    /// Creates a new [TripleState] from the `nominal` value and its `perturbation`.
    /// The estimate starts at the nominal value.
    pub fn perturbed(nominal: T, perturbation: T) -> Self {
        Self {
            nominal,
            actual: nominal + perturbation,
            estimated: nominal,
        }
    }
}

impl<T: Copy> TripleState<T> {
    pub fn nominal(&self) -> T {
        self.nominal
    }

    pub fn actual(&self) -> T {
        self.actual
    }

    pub fn estimated(&self) -> T {
        self.estimated
    }

    /// Value in given [StateKind]
    pub fn get(&self, kind: StateKind) -> T {
        match kind {
            StateKind::Nominal => self.nominal,
            StateKind::Actual => self.actual,
            StateKind::Estimated => self.estimated,
        }
    }

    pub(crate) fn set_estimated(&mut self, value: T) {
        self.estimated = value;
    }
}

/// One grid cell: position and clock drift coefficients of a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// (inline, crossline, depth) position
    pub position: TripleState<Vector3<f64>>,
    /// (0th, 1st, 2nd) order clock drift polynomial coefficients
    pub drift: TripleState<Vector3<f64>>,
}

impl GridCell {
    /// Displacement between actual and nominal positions
    pub fn displacement(&self) -> Vector3<f64> {
        self.position.actual() - self.position.nominal()
    }

    /// Distance between estimated and actual positions
    pub fn position_error(&self) -> f64 {
        (self.position.estimated() - self.position.actual()).norm()
    }

    /// Difference between estimated and actual drift coefficients
    pub fn drift_error(&self) -> Vector3<f64> {
        self.drift.estimated() - self.drift.actual()
    }
}
