//! Pluggable regression interface.
//!
//! A calibration only needs two things from its regressor: fit a smooth
//! vector field to paired points and evaluate it anywhere. Anything that can
//! do that (a Gaussian process, kernel ridge, RBF interpolation) fits here.

use puffersphere_core::Vec3;

use crate::CalibrationError;

pub trait Regressor: Sized {
    type Options;

    /// Fit to `outputs[i] ≈ f(inputs[i])`.
    fn fit(
        inputs: &[Vec3],
        outputs: &[Vec3],
        opts: &Self::Options,
    ) -> Result<Self, CalibrationError>;

    fn predict(&self, x: &Vec3) -> Vec3;
}

pub(crate) fn check_pairs(inputs: &[Vec3], outputs: &[Vec3]) -> Result<(), CalibrationError> {
    if inputs.len() != outputs.len() {
        return Err(CalibrationError::DimensionMismatch {
            inputs: inputs.len(),
            outputs: outputs.len(),
        });
    }
    if inputs.is_empty() {
        return Err(CalibrationError::TooFewSamples { got: 0, min: 1 });
    }
    Ok(())
}
