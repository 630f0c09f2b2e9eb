use anyhow::{Result, ensure};
use puffersphere_calib::{FitOptions, GaussianProcessOptions, MIN_CALIBRATION_SAMPLES};
use puffersphere_core::Real;
use serde::{Deserialize, Serialize};

use crate::artifact::CalibrationArtifact;
use crate::log_io::CalibrationLog;
use crate::session::{InvalidationPolicy, ProblemType};

/// Spherical display touch calibration.
#[derive(Debug)]
pub struct SphereCalibrationProblem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereCalibrationConfig {
    /// Touches at least this far from their target are discarded, degrees.
    pub outlier_threshold_deg: Real,
    pub min_samples: usize,
    pub min_latitude_margin_deg: Real,
    pub gp: GaussianProcessOptions,
    /// Also fit constant and polynomial corrections for the report.
    pub fit_baselines: bool,
}

impl Default for SphereCalibrationConfig {
    fn default() -> Self {
        let fit = FitOptions::default();
        Self {
            outlier_threshold_deg: fit.outlier_threshold_deg,
            min_samples: fit.min_samples,
            min_latitude_margin_deg: fit.min_latitude_margin_deg,
            gp: fit.gp,
            fit_baselines: true,
        }
    }
}

impl SphereCalibrationConfig {
    pub fn fit_opts(&self) -> FitOptions {
        FitOptions {
            outlier_threshold_deg: self.outlier_threshold_deg,
            min_samples: self.min_samples,
            min_latitude_margin_deg: self.min_latitude_margin_deg,
            gp: self.gp.clone(),
        }
    }
}

impl ProblemType for SphereCalibrationProblem {
    type Config = SphereCalibrationConfig;
    type Input = CalibrationLog;
    type State = super::SphereCalibrationState;
    type Output = CalibrationArtifact;
    type Export = CalibrationArtifact;

    fn name() -> &'static str {
        "sphere_touch_gp"
    }

    fn validate_input(input: &CalibrationLog) -> Result<()> {
        ensure!(
            !input.samples.is_empty(),
            "calibration log '{}' has no samples",
            input.source
        );
        for s in &input.samples {
            ensure!(
                s.tuio.x.is_finite()
                    && s.tuio.y.is_finite()
                    && s.target.lon.is_finite()
                    && s.target.lat.is_finite(),
                "sample {} has non-finite coordinates",
                s.id
            );
        }
        Ok(())
    }

    fn validate_config(config: &SphereCalibrationConfig) -> Result<()> {
        ensure!(
            config.outlier_threshold_deg > 0.0 && config.outlier_threshold_deg <= 180.0,
            "outlier_threshold_deg must be in (0, 180], got {}",
            config.outlier_threshold_deg
        );
        ensure!(
            config.min_samples >= MIN_CALIBRATION_SAMPLES,
            "min_samples must be at least {MIN_CALIBRATION_SAMPLES}, got {}",
            config.min_samples
        );
        ensure!(
            config.min_latitude_margin_deg >= 0.0,
            "min_latitude_margin_deg must be non-negative"
        );
        config.gp.validate()?;
        Ok(())
    }

    fn on_config_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_COMPUTED
    }

    fn export(
        output: &CalibrationArtifact,
        _config: &SphereCalibrationConfig,
    ) -> Result<CalibrationArtifact> {
        Ok(output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffersphere_core::CalibrationSample;

    #[test]
    fn default_config_is_valid() {
        SphereCalibrationProblem::validate_config(&SphereCalibrationConfig::default()).unwrap();
        let cfg = SphereCalibrationConfig::default();
        assert_eq!(cfg.fit_opts().outlier_threshold_deg, 25.0);
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = SphereCalibrationConfig {
            min_samples: 3,
            ..Default::default()
        };
        assert!(SphereCalibrationProblem::validate_config(&cfg).is_err());
        let cfg = SphereCalibrationConfig {
            outlier_threshold_deg: 0.0,
            ..Default::default()
        };
        assert!(SphereCalibrationProblem::validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_empty_or_nan_logs() {
        let empty = CalibrationLog::new("x.csv", Vec::new());
        assert!(SphereCalibrationProblem::validate_input(&empty).is_err());
        let nan = CalibrationSample::from_log_row(0, 0.0, 0.0, Real::NAN, 0.5);
        let nan = CalibrationLog::new("x.csv", vec![nan]);
        assert!(SphereCalibrationProblem::validate_input(&nan).is_err());
    }

    #[test]
    fn partial_config_json_uses_defaults() {
        let cfg: SphereCalibrationConfig =
            serde_json::from_str(r#"{"outlier_threshold_deg": 15.0}"#).unwrap();
        assert_eq!(cfg.outlier_threshold_deg, 15.0);
        assert_eq!(cfg.min_samples, MIN_CALIBRATION_SAMPLES);
        assert!(cfg.fit_baselines);
    }
}
