use std::collections::BTreeMap;

use puffersphere_calib::{CalibrationModel, CorrectionMode, ErrorStats, TrainingSet};
use serde::{Deserialize, Serialize};

use crate::artifact::BaselineCorrections;

/// Intermediate results of the sphere calibration steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SphereCalibrationState {
    pub training: Option<TrainingSet>,
    pub model: Option<CalibrationModel>,
    pub baselines: Option<BaselineCorrections>,
    /// Error of each evaluated correction mode on the kept samples.
    pub errors: BTreeMap<CorrectionMode, ErrorStats>,
}

impl SphereCalibrationState {
    /// Forget everything derived from the training set.
    pub fn clear_fit(&mut self) {
        self.model = None;
        self.baselines = None;
        self.errors.clear();
    }
}
