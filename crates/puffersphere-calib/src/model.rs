//! The Gaussian-process calibration model.
//!
//! Training pipeline:
//! 1. drop samples further than the outlier threshold from their target,
//! 2. require at least [`MIN_CALIBRATION_SAMPLES`] survivors,
//! 3. average repeated touches per target on the sphere,
//! 4. fit a GP from averaged touch (unit Cartesian) to the displacement
//!    towards the target, so that far from the data the model falls back to
//!    the raw touch,
//! 5. evaluate on the individual kept samples.
//!
//! The fitted model is immutable; query it with [`CalibrationModel::predict`]
//! or [`CalibrationModel::correct`].

use std::f64::consts::FRAC_PI_2;

use puffersphere_core::{
    CalibrationSample, LonLat, Real, TouchCalibration, TuioCoord, Vec3, cartesian_to_polar,
    wrap_two_pi,
};
use serde::{Deserialize, Serialize};

use crate::correction::{Correction, NoCorrection, evaluate_correction};
use crate::grouping::{TargetGroup, group_by_target, intra_target_rms};
use crate::outliers::filter_outliers;
use crate::regression::Regressor;
use crate::{CalibrationError, ErrorStats, GaussianProcess, GaussianProcessOptions};

/// A calibration cannot be fitted from fewer samples than this.
pub const MIN_CALIBRATION_SAMPLES: usize = 5;

/// Options for [`CalibrationModel::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Samples at least this far from their target are discarded, degrees.
    pub outlier_threshold_deg: Real,
    /// Raised to [`MIN_CALIBRATION_SAMPLES`] if set lower.
    pub min_samples: usize,
    /// The trusted region ends this far below the lowest target, degrees.
    pub min_latitude_margin_deg: Real,
    pub gp: GaussianProcessOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            outlier_threshold_deg: 25.0,
            min_samples: MIN_CALIBRATION_SAMPLES,
            min_latitude_margin_deg: 5.0,
            gp: GaussianProcessOptions::default(),
        }
    }
}

impl FitOptions {
    pub fn effective_min_samples(&self) -> usize {
        self.min_samples.max(MIN_CALIBRATION_SAMPLES)
    }
}

/// Outlier-filtered, grouped training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub total: usize,
    pub excluded: usize,
    pub kept: Vec<CalibrationSample>,
    pub groups: Vec<TargetGroup>,
    /// Pooled spread of repeated touches, radians.
    pub intra_target_rms: Real,
}

impl TrainingSet {
    pub fn unique_targets(&self) -> usize {
        self.groups.len()
    }

    /// Average number of kept touches per target, rounded.
    pub fn repeats_per_target(&self) -> usize {
        if self.groups.is_empty() {
            return 0;
        }
        (self.kept.len() as Real / self.groups.len() as Real).round() as usize
    }

    /// Lowest latitude among the kept targets.
    pub fn lowest_target_latitude(&self) -> Real {
        self.groups
            .iter()
            .map(|g| g.target.lat)
            .fold(FRAC_PI_2, Real::min)
    }
}

/// Filter and group `samples` for fitting.
pub fn prepare_training_set(
    samples: &[CalibrationSample],
    opts: &FitOptions,
) -> Result<TrainingSet, CalibrationError> {
    let split = filter_outliers(samples, opts.outlier_threshold_deg.to_radians());
    let min = opts.effective_min_samples();
    if split.kept.len() < min {
        return Err(CalibrationError::TooFewSamples {
            got: split.kept.len(),
            min,
        });
    }
    let groups = group_by_target(&split.kept);
    let intra = intra_target_rms(&groups);
    Ok(TrainingSet {
        total: samples.len(),
        excluded: split.excluded_count(),
        kept: split.kept,
        groups,
        intra_target_rms: intra,
    })
}

/// What the fit saw and how well it did on its own training samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub total_samples: usize,
    pub excluded_outliers: usize,
    pub used_samples: usize,
    pub unique_targets: usize,
    pub repeats_per_target: usize,
    pub intra_target_rms_deg: Real,
    /// Uncorrected error of the kept samples.
    pub raw_error: ErrorStats,
    /// Corrected error of the kept samples.
    pub error: ErrorStats,
    /// Lowest trusted latitude, radians.
    pub min_latitude: Real,
}

/// Fitted touch calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    gp: GaussianProcess,
    diagnostics: FitDiagnostics,
}

impl CalibrationModel {
    /// Fit from raw samples.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::TooFewSamples`] when fewer than
    /// [`MIN_CALIBRATION_SAMPLES`] survive outlier filtering; GP errors from
    /// the regression.
    pub fn fit(samples: &[CalibrationSample], opts: &FitOptions) -> Result<Self, CalibrationError> {
        let training = prepare_training_set(samples, opts)?;
        Self::fit_prepared(&training, opts)
    }

    /// Fit from an already prepared training set.
    pub fn fit_prepared(
        training: &TrainingSet,
        opts: &FitOptions,
    ) -> Result<Self, CalibrationError> {
        let min = opts.effective_min_samples();
        if training.kept.len() < min {
            return Err(CalibrationError::TooFewSamples {
                got: training.kept.len(),
                min,
            });
        }

        let inputs: Vec<Vec3> = training
            .groups
            .iter()
            .map(|g| g.mean_touch.to_cartesian())
            .collect();
        let outputs: Vec<Vec3> = training
            .groups
            .iter()
            .zip(&inputs)
            .map(|(g, x)| g.target.to_cartesian() - x)
            .collect();
        let gp = GaussianProcess::fit(&inputs, &outputs, &opts.gp)?;

        let raw_error = evaluate_correction(&NoCorrection, &training.kept)?;
        let min_latitude =
            training.lowest_target_latitude() - opts.min_latitude_margin_deg.to_radians();
        let mut model = Self {
            gp,
            diagnostics: FitDiagnostics {
                total_samples: training.total,
                excluded_outliers: training.excluded,
                used_samples: training.kept.len(),
                unique_targets: training.unique_targets(),
                repeats_per_target: training.repeats_per_target(),
                intra_target_rms_deg: training.intra_target_rms.to_degrees(),
                raw_error,
                error: raw_error,
                min_latitude,
            },
        };
        model.diagnostics.error = model.evaluate(&training.kept)?;

        log::info!(
            "calibration fit: {} samples on {} targets, rms {:.3} deg (raw {:.3} deg), \
             median {:.3} deg",
            model.diagnostics.used_samples,
            model.diagnostics.unique_targets,
            model.diagnostics.error.rms_deg,
            model.diagnostics.raw_error.rms_deg,
            model.diagnostics.error.median_deg
        );
        Ok(model)
    }

    /// Corrected position of a raw sensor coordinate, longitude in `(-π, π]`.
    pub fn predict(&self, raw: TuioCoord) -> LonLat {
        self.correct(raw.to_polar())
    }

    /// Corrected position of a raw touch given in polar coordinates.
    pub fn correct(&self, touch: LonLat) -> LonLat {
        let x = touch.to_cartesian();
        let corrected = x + self.gp.predict(&x);
        cartesian_to_polar(&corrected)
    }

    /// Error of the corrected touches in `samples`.
    pub fn evaluate(&self, samples: &[CalibrationSample]) -> Result<ErrorStats, CalibrationError> {
        evaluate_correction(self, samples)
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }

    pub fn regressor(&self) -> &GaussianProcess {
        &self.gp
    }

    pub fn min_latitude(&self) -> Real {
        self.diagnostics.min_latitude
    }
}

impl Correction for CalibrationModel {
    fn correct(&self, touch: LonLat) -> LonLat {
        CalibrationModel::correct(self, touch)
    }
}

impl TouchCalibration for CalibrationModel {
    fn calibrated_touch(&self, raw: TuioCoord) -> LonLat {
        let p = self.predict(raw);
        LonLat::new(wrap_two_pi(p.lon), p.lat)
    }

    fn min_latitude(&self) -> Option<Real> {
        Some(self.diagnostics.min_latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffersphere_core::synthetic::noise::AngularNoise;
    use puffersphere_core::synthetic::sphere::{distorted_samples, targets_above};

    fn quick_opts() -> FitOptions {
        FitOptions {
            gp: GaussianProcessOptions {
                n_restarts: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn training_set_counts() {
        let targets = targets_above(20, -0.5);
        let mut samples = distorted_samples(&targets, 3, |p| p, &AngularNoise::new(3, 0.01));
        samples[0].touch = LonLat::new(samples[0].target.lon, samples[0].target.lat - 1.0);
        let training = prepare_training_set(&samples, &FitOptions::default()).unwrap();
        assert_eq!(training.total, samples.len());
        assert_eq!(training.excluded, 1);
        assert_eq!(training.unique_targets(), targets.len());
        assert_eq!(training.repeats_per_target(), 3);
        assert!(training.intra_target_rms > 0.0);
    }

    #[test]
    fn min_latitude_sits_below_lowest_target() {
        let targets = targets_above(24, -0.4);
        let samples = distorted_samples(&targets, 1, |p| p, &AngularNoise::default());
        let model = CalibrationModel::fit(&samples, &quick_opts()).unwrap();
        let lowest = targets.iter().map(|t| t.lat).fold(FRAC_PI_2, Real::min);
        assert!((model.min_latitude() - (lowest - 5f64.to_radians())).abs() < 1e-12);
        assert_eq!(TouchCalibration::min_latitude(&model), Some(model.min_latitude()));
    }

    #[test]
    fn calibrated_touch_longitude_is_non_negative() {
        let targets = targets_above(24, -0.4);
        let samples = distorted_samples(&targets, 1, |p| p, &AngularNoise::default());
        let model = CalibrationModel::fit(&samples, &quick_opts()).unwrap();
        for s in &samples {
            let p = model.calibrated_touch(s.tuio);
            assert!((0.0..std::f64::consts::TAU).contains(&p.lon), "{p:?}");
        }
    }
}
