/// Speed of sound in sea water (m.s⁻¹)
pub const SOUND_VELOCITY_M_S: f64 = 1500.0;

/// Nominal interval between two consecutive shots (s)
pub const SHOT_INTERVAL_S: f64 = 20.0;

/// Largest travel time residual (s) for a node to be considered converged
pub const MAX_RESIDUAL_S: f64 = 1.0E-6;

/// Maximal number of Gauss-Newton updates per node (emergency break)
pub const MAX_ITERATIONS: usize = 123;

/// Source to node distances below this value (m) are degenerate
pub const MIN_DISTANCE_M: f64 = 1.0E-6;

/// Largest tolerated condition number of the (scaled) normal matrix
pub const MAX_CONDITION_NUMBER: f64 = 1.0E12;

/// Number of spatial axes
pub const SPACE_DIM: usize = 3;

/// Number of clock drift polynomial coefficients
pub const DRIFT_DIM: usize = 3;
