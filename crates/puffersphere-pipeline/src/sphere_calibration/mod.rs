//! Touch calibration of a spherical display from a recorded calibration log.
//!
//! Steps, in order:
//! 1. [`step_filter`]: outlier removal and target grouping,
//! 2. [`step_fit`]: Gaussian-process correction model,
//! 3. [`step_baselines`]: constant and polynomial corrections for comparison,
//! 4. [`step_finalize`]: assemble the [`CalibrationArtifact`](crate::CalibrationArtifact).
//!
//! [`run_calibration`] runs all of them.

mod problem;
mod state;
mod steps;

pub use problem::{SphereCalibrationConfig, SphereCalibrationProblem};
pub use state::SphereCalibrationState;
pub use steps::{
    FilterOptions, FitStepOptions, run_calibration, step_baselines, step_filter, step_finalize,
    step_fit,
};
