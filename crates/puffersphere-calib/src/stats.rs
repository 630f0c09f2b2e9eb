use puffersphere_core::Real;
use serde::{Deserialize, Serialize};

use crate::CalibrationError;

/// Angular error summary, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub count: usize,
    pub rms_deg: Real,
    pub median_deg: Real,
    pub mean_deg: Real,
    pub max_deg: Real,
}

impl ErrorStats {
    /// Summarize per-sample errors given in radians.
    pub fn from_errors(errors_rad: &[Real]) -> Result<Self, CalibrationError> {
        if errors_rad.is_empty() {
            return Err(CalibrationError::NoSamples);
        }
        let mut deg: Vec<Real> = errors_rad.iter().map(|e| e.to_degrees()).collect();
        deg.sort_by(|a, b| a.total_cmp(b));

        let n = deg.len();
        let mid = n / 2;
        let median_deg = if n % 2 == 0 {
            0.5 * (deg[mid - 1] + deg[mid])
        } else {
            deg[mid]
        };
        let sum: Real = deg.iter().sum();
        let sum_sq: Real = deg.iter().map(|e| e * e).sum();
        Ok(Self {
            count: n,
            rms_deg: (sum_sq / n as Real).sqrt(),
            median_deg,
            mean_deg: sum / n as Real,
            max_deg: deg[n - 1],
        })
    }
}
