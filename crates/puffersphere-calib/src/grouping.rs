//! Averaging of repeated touches on the same target.

use std::collections::BTreeMap;

use puffersphere_core::{
    CalibrationSample, LonLat, Real, Vec3, cartesian_to_polar, spherical_distance,
};
use serde::{Deserialize, Serialize};

/// All touches recorded for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub target: LonLat,
    /// Spherical mean of the raw touches.
    pub mean_touch: LonLat,
    pub count: usize,
    /// RMS distance of the touches from their mean, radians.
    pub spread_rms: Real,
}

/// Direction of the summed unit vectors.
///
/// Returns `None` for an empty set or when the points cancel out.
pub fn spherical_mean(points: impl IntoIterator<Item = LonLat>) -> Option<LonLat> {
    let (sum, n) = points
        .into_iter()
        .fold((Vec3::zeros(), 0usize), |(acc, n), p| (acc + p.to_cartesian(), n + 1));
    if n == 0 || sum.norm() < 1e-12 {
        return None;
    }
    Some(cartesian_to_polar(&sum))
}

/// Bit-exact target identity; `-0.0` and `0.0` are the same target.
fn target_key(p: LonLat) -> (u64, u64) {
    ((p.lon + 0.0).to_bits(), (p.lat + 0.0).to_bits())
}

/// Group samples by identical target, in order of first appearance.
pub fn group_by_target(samples: &[CalibrationSample]) -> Vec<TargetGroup> {
    let mut order: Vec<(u64, u64)> = Vec::new();
    let mut members: BTreeMap<(u64, u64), Vec<&CalibrationSample>> = BTreeMap::new();
    for s in samples {
        let key = target_key(s.target);
        members
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(s);
    }

    order
        .iter()
        .filter_map(|key| {
            let group = members.get(key)?;
            let target = group.first()?.target;
            // touches of one target never cancel out once outliers are gone;
            // fall back to the target itself if they somehow do
            let mean_touch = spherical_mean(group.iter().map(|s| s.touch)).unwrap_or(target);
            let sq: Real = group
                .iter()
                .map(|s| spherical_distance(s.touch, mean_touch).powi(2))
                .sum();
            Some(TargetGroup {
                target,
                mean_touch,
                count: group.len(),
                spread_rms: (sq / group.len() as Real).sqrt(),
            })
        })
        .collect()
}

/// Pooled RMS spread of touches around their per-target means, radians.
pub fn intra_target_rms(groups: &[TargetGroup]) -> Real {
    let (sq, n) = groups.iter().fold((0.0, 0usize), |(sq, n), g| {
        (sq + g.spread_rms.powi(2) * g.count as Real, n + g.count)
    });
    if n == 0 { 0.0 } else { (sq / n as Real).sqrt() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_repeats_and_averages() {
        let a = LonLat::new(0.2, 0.4);
        let b = LonLat::new(-1.0, 0.1);
        let samples = vec![
            CalibrationSample::new(0, a, LonLat::new(0.21, 0.4).to_tuio()),
            CalibrationSample::new(1, b, b.to_tuio()),
            CalibrationSample::new(2, a, LonLat::new(0.19, 0.4).to_tuio()),
        ];
        let groups = group_by_target(&samples);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].count, 1);
        assert!(spherical_distance(groups[0].mean_touch, a) < 1e-4);
        assert!(groups[0].spread_rms > 0.0);
        assert!(groups[1].spread_rms < 1e-12);
        assert!(intra_target_rms(&groups) > 0.0);
    }

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert!(spherical_mean(Vec::new()).is_none());
        let antipodal = [LonLat::new(0.0, 0.0), LonLat::new(std::f64::consts::PI, 0.0)];
        assert!(spherical_mean(antipodal).is_none());
    }
}
