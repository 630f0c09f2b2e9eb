use serde::{Deserialize, Serialize};

use crate::{LonLat, Real, TuioCoord, Vec2, Vec3, spherical_distance};

/// One recorded touch aimed at a known target.
///
/// `touch` is derived from `tuio` at construction; both longitudes are kept
/// in `(-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Index of the target presentation this touch answered.
    pub id: usize,
    pub target: LonLat,
    pub tuio: TuioCoord,
    pub touch: LonLat,
}

impl CalibrationSample {
    pub fn new(id: usize, target: LonLat, tuio: TuioCoord) -> Self {
        Self {
            id,
            target: target.wrapped(),
            tuio,
            touch: tuio.to_polar().wrapped(),
        }
    }

    /// Build a sample from one calibration log row.
    pub fn from_log_row(
        id: usize,
        target_lon: Real,
        target_lat: Real,
        tuio_x: Real,
        tuio_y: Real,
    ) -> Self {
        Self::new(
            id,
            LonLat::new(target_lon, target_lat),
            TuioCoord::new(tuio_x, tuio_y),
        )
    }

    /// Great-circle distance between the raw touch and its target.
    pub fn offset(&self) -> Real {
        spherical_distance(self.touch, self.target)
    }

    pub fn target_cartesian(&self) -> Vec3 {
        self.target.to_cartesian()
    }

    pub fn touch_cartesian(&self) -> Vec3 {
        self.touch.to_cartesian()
    }

    pub fn target_az(&self) -> Vec2 {
        self.target.to_az()
    }

    pub fn touch_az(&self) -> Vec2 {
        self.touch.to_az()
    }

    pub fn target_tuio(&self) -> TuioCoord {
        self.target.to_tuio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn longitudes_are_wrapped() {
        let s = CalibrationSample::from_log_row(3, 1.5 * PI, 0.2, 0.75, 0.6);
        assert!((s.target.lon + 0.5 * PI).abs() < 1e-12);
        assert!((s.touch.lon + 0.5 * PI).abs() < 1e-12);
        assert!((s.touch.lat - (0.6 * PI - 0.5 * PI)).abs() < 1e-12);
        assert_eq!(s.id, 3);
    }

    #[test]
    fn offset_of_exact_touch_is_zero() {
        let target = LonLat::new(0.4, 0.3);
        let s = CalibrationSample::new(0, target, target.to_tuio());
        assert!(s.offset() < 1e-12);
        assert!((s.target_tuio().x - s.tuio.x).abs() < 1e-12);
        assert!((s.target_cartesian() - s.touch_cartesian()).norm() < 1e-12);
    }
}
