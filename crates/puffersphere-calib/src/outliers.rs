use puffersphere_core::{CalibrationSample, Real};
use serde::{Deserialize, Serialize};

/// Samples split by raw-vs-target offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierSplit {
    pub kept: Vec<CalibrationSample>,
    pub excluded: Vec<CalibrationSample>,
}

impl OutlierSplit {
    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}

/// Keep samples whose touch lies strictly within `threshold` radians of the
/// target; the rest are mis-touches and go to `excluded`.
pub fn filter_outliers(samples: &[CalibrationSample], threshold: Real) -> OutlierSplit {
    let (kept, excluded): (Vec<_>, Vec<_>) = samples.iter().partition(|s| s.offset() < threshold);
    OutlierSplit { kept, excluded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffersphere_core::LonLat;

    #[test]
    fn splits_on_offset() {
        let target = LonLat::new(0.0, 0.5);
        let near = LonLat::new(0.1, 0.5);
        let far = LonLat::new(1.2, 0.5);
        let samples = vec![
            CalibrationSample::new(0, target, near.to_tuio()),
            CalibrationSample::new(1, target, far.to_tuio()),
            CalibrationSample::new(2, target, target.to_tuio()),
        ];
        let split = filter_outliers(&samples, 25f64.to_radians());
        assert_eq!(split.kept.len(), 2);
        assert_eq!(split.excluded_count(), 1);
        assert_eq!(split.excluded[0].id, 1);
    }
}
