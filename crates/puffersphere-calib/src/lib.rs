//! Touch calibration models for spherical displays.
//!
//! The main entry point is [`CalibrationModel`]: it filters outliers from a
//! recorded calibration session, averages repeated touches per target, and
//! fits a joint three-output Gaussian process that maps raw touch positions
//! (unit-sphere Cartesian) to corrected ones.
//!
//! For comparison the crate also provides simpler baseline corrections
//! ([`ConstantCorrection`], [`PolynomialCorrection`]) that share the
//! [`Correction`] interface and the [`ErrorStats`] report.
//!
//! Modules:
//! - [`regression`]: pluggable `fit`/`predict` interface,
//! - [`gp`]: squared-exponential Gaussian process,
//! - [`optimize`]: derivative-free minimizers used for hyperparameters,
//! - [`outliers`], [`grouping`]: training-set preparation,
//! - [`correction`]: the correction modes and baselines,
//! - [`model`]: the full calibration model.

pub mod correction;
pub mod error;
pub mod gp;
pub mod grouping;
pub mod model;
pub mod optimize;
pub mod outliers;
pub mod regression;
pub mod stats;

pub use correction::{
    Correction, ConstantCorrection, CorrectionMode, NoCorrection, PolynomialCorrection,
    PolynomialDegree, evaluate_correction,
};
pub use error::CalibrationError;
pub use gp::{GaussianProcess, GaussianProcessOptions, SquaredExponential};
pub use grouping::{TargetGroup, group_by_target, intra_target_rms, spherical_mean};
pub use model::{
    CalibrationModel, FitDiagnostics, FitOptions, MIN_CALIBRATION_SAMPLES, TrainingSet,
    prepare_training_set,
};
pub use outliers::{OutlierSplit, filter_outliers};
pub use regression::Regressor;
pub use stats::ErrorStats;
