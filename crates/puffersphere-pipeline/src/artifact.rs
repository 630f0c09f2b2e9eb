//! The calibration artifact loaded by the runtime touch path.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use puffersphere_calib::{
    CalibrationModel, ConstantCorrection, Correction, CorrectionMode, NoCorrection,
    PolynomialCorrection,
};
use puffersphere_core::{LonLat, Real, TouchCalibration, TuioCoord, wrap_two_pi};
use serde::{Deserialize, Serialize};

/// Baseline corrections fitted alongside the GP for comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineCorrections {
    pub constant: ConstantCorrection,
    pub quadratic: PolynomialCorrection,
    pub cubic: PolynomialCorrection,
}

/// A fitted calibration with its provenance and expected accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationArtifact {
    /// Log file the calibration was fitted from.
    pub calibration_file: String,
    pub created_at: u64,
    pub model: CalibrationModel,
    pub baselines: Option<BaselineCorrections>,
    /// RMS error of each fitted mode on its training samples, degrees.
    pub expected_rmse: BTreeMap<CorrectionMode, Real>,
    /// Lowest trusted latitude, radians.
    pub min_latitude: Real,
}

impl CalibrationArtifact {
    /// Corrected position of a raw touch, `lon ∈ [0, 2π)`.
    pub fn get_calibrated_touch(&self, x: Real, y: Real) -> LonLat {
        self.calibrated_touch(TuioCoord::new(x, y))
    }

    /// Like [`get_calibrated_touch`](Self::get_calibrated_touch) with an
    /// explicit correction mode.
    ///
    /// # Errors
    ///
    /// Fails for a baseline mode when the artifact carries no baselines.
    pub fn get_calibrated_touch_with(
        &self,
        mode: CorrectionMode,
        x: Real,
        y: Real,
    ) -> Result<LonLat> {
        let p = self.correction(mode)?.correct(TuioCoord::new(x, y).to_polar());
        Ok(LonLat::new(wrap_two_pi(p.lon), p.lat))
    }

    pub fn correction(&self, mode: CorrectionMode) -> Result<&dyn Correction> {
        let baselines = || {
            self.baselines
                .as_ref()
                .ok_or_else(|| anyhow!("calibration has no {mode} correction"))
        };
        let correction: &dyn Correction = match mode {
            CorrectionMode::None => &NoCorrection,
            CorrectionMode::Gp => &self.model,
            CorrectionMode::Constant => &baselines()?.constant,
            CorrectionMode::Quadratic => &baselines()?.quadratic,
            CorrectionMode::Cubic => &baselines()?.cubic,
        };
        Ok(correction)
    }

    /// Expected RMS error of `mode`, degrees; falls back to the uncorrected
    /// error for modes that were not evaluated.
    pub fn expected_rmse(&self, mode: CorrectionMode) -> Real {
        self.expected_rmse
            .get(&mode)
            .or_else(|| self.expected_rmse.get(&CorrectionMode::None))
            .copied()
            .unwrap_or(Real::NAN)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write calibration {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read calibration {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("invalid calibration file {}", path.display()))
    }
}

impl TouchCalibration for CalibrationArtifact {
    fn calibrated_touch(&self, raw: TuioCoord) -> LonLat {
        self.model.calibrated_touch(raw)
    }

    fn min_latitude(&self) -> Option<Real> {
        Some(self.min_latitude)
    }
}
