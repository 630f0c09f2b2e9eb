use crate::{LonLat, Real, TuioCoord};

/// Maps raw sensor coordinates to corrected sphere positions at runtime.
///
/// Implementors are immutable once built and cheap to query; the touch loop
/// calls [`calibrated_touch`](Self::calibrated_touch) once per contact per
/// frame.
pub trait TouchCalibration {
    fn calibrated_touch(&self, raw: TuioCoord) -> LonLat;

    /// Lowest latitude the calibration is trusted at, if it knows one.
    fn min_latitude(&self) -> Option<Real> {
        None
    }
}

impl<T: TouchCalibration + ?Sized> TouchCalibration for Box<T> {
    fn calibrated_touch(&self, raw: TuioCoord) -> LonLat {
        (**self).calibrated_touch(raw)
    }

    fn min_latitude(&self) -> Option<Real> {
        (**self).min_latitude()
    }
}
