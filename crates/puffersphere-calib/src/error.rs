use puffersphere_core::Real;
use thiserror::Error;

/// Errors raised while fitting or evaluating a calibration.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("need at least {min} calibration samples, got {got}")]
    TooFewSamples { got: usize, min: usize },
    #[error(
        "kernel matrix is not positive definite (length_scale={length_scale:.3e}, variance={variance:.3e}, nugget={nugget:.3e})"
    )]
    SingularKernel {
        length_scale: Real,
        variance: Real,
        nugget: Real,
    },
    #[error("input/output count mismatch: {inputs} inputs vs {outputs} outputs")]
    DimensionMismatch { inputs: usize, outputs: usize },
    #[error("least-squares solve failed for {mode} correction: {reason}")]
    SolveFailed { mode: &'static str, reason: String },
    #[error("no samples to evaluate")]
    NoSamples,
    #[error("invalid option: {0}")]
    InvalidOption(String),
}
