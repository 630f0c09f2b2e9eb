//! Correction modes and the baseline corrections they are compared against.
//!
//! Baselines work in the azimuthal-equidistant plane centred on the north
//! pole:
//! - [`ConstantCorrection`] scales the radius by one factor,
//! - [`PolynomialCorrection`] maps `(x, y)` through a bivariate polynomial
//!   of degree 2 or 3 fitted by linear least squares.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use puffersphere_core::{CalibrationSample, LonLat, Real, az_to_polar, spherical_distance};
use serde::{Deserialize, Serialize};

use crate::optimize::golden_section;
use crate::{CalibrationError, ErrorStats};

/// How raw touches are corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMode {
    None,
    Constant,
    Quadratic,
    Cubic,
    Gp,
}

impl CorrectionMode {
    pub const ALL: [CorrectionMode; 5] = [
        CorrectionMode::None,
        CorrectionMode::Constant,
        CorrectionMode::Quadratic,
        CorrectionMode::Cubic,
        CorrectionMode::Gp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CorrectionMode::None => "none",
            CorrectionMode::Constant => "constant",
            CorrectionMode::Quadratic => "quadratic",
            CorrectionMode::Cubic => "cubic",
            CorrectionMode::Gp => "gp",
        }
    }
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CorrectionMode {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CorrectionMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CalibrationError::InvalidOption(format!("unknown correction mode '{s}'"))
            })
    }
}

/// Maps a raw touch position to a corrected one.
pub trait Correction {
    fn correct(&self, touch: LonLat) -> LonLat;
}

/// Identity: the raw touch as reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl Correction for NoCorrection {
    fn correct(&self, touch: LonLat) -> LonLat {
        touch
    }
}

/// Per-sample distance between the corrected touch and the target.
pub fn evaluate_correction(
    correction: &dyn Correction,
    samples: &[CalibrationSample],
) -> Result<ErrorStats, CalibrationError> {
    let errors: Vec<Real> = samples
        .iter()
        .map(|s| spherical_distance(correction.correct(s.touch), s.target))
        .collect();
    ErrorStats::from_errors(&errors)
}

fn rms_error(correction: &dyn Correction, samples: &[CalibrationSample]) -> Real {
    let sq: Real = samples
        .iter()
        .map(|s| spherical_distance(correction.correct(s.touch), s.target).powi(2))
        .sum();
    (sq / samples.len().max(1) as Real).sqrt()
}

/// Radial scale about the north pole in the azimuthal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantCorrection {
    pub scale: Real,
}

impl Default for ConstantCorrection {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ConstantCorrection {
    pub const SCALE_BOUNDS: (Real, Real) = (0.0, 2.0);

    /// Scale minimizing the RMS angular error over `samples`.
    pub fn fit(samples: &[CalibrationSample]) -> Result<Self, CalibrationError> {
        if samples.is_empty() {
            return Err(CalibrationError::NoSamples);
        }
        let (lo, hi) = Self::SCALE_BOUNDS;
        let (scale, rms) =
            golden_section(|scale| rms_error(&Self { scale }, samples), lo, hi, 1e-9, 200);
        log::debug!("constant correction: scale={scale:.6} rms={:.4} deg", rms.to_degrees());
        Ok(Self { scale })
    }
}

impl Correction for ConstantCorrection {
    fn correct(&self, touch: LonLat) -> LonLat {
        let az = touch.to_az() * self.scale;
        az_to_polar(az.x, az.y)
    }
}

/// Polynomial degree of a [`PolynomialCorrection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialDegree {
    Quadratic,
    Cubic,
}

impl PolynomialDegree {
    pub fn num_terms(self) -> usize {
        match self {
            PolynomialDegree::Quadratic => 6,
            PolynomialDegree::Cubic => 10,
        }
    }

    pub fn mode(self) -> CorrectionMode {
        match self {
            PolynomialDegree::Quadratic => CorrectionMode::Quadratic,
            PolynomialDegree::Cubic => CorrectionMode::Cubic,
        }
    }

    fn terms(self, x: Real, y: Real) -> Vec<Real> {
        let mut t = vec![x, y, x * x, y * y, x * y, 1.0];
        if self == PolynomialDegree::Cubic {
            t.extend_from_slice(&[x * x * y, x * y * y, y * y * y, x * x * x]);
        }
        t
    }
}

/// Bivariate polynomial map of azimuthal coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialCorrection {
    pub degree: PolynomialDegree,
    pub coeff_x: Vec<Real>,
    pub coeff_y: Vec<Real>,
}

impl PolynomialCorrection {
    /// Identity map of the given degree.
    pub fn identity(degree: PolynomialDegree) -> Self {
        let mut coeff_x = vec![0.0; degree.num_terms()];
        let mut coeff_y = vec![0.0; degree.num_terms()];
        coeff_x[0] = 1.0;
        coeff_y[1] = 1.0;
        Self {
            degree,
            coeff_x,
            coeff_y,
        }
    }

    /// Least-squares fit of touch azimuthal coordinates to target ones.
    pub fn fit(
        samples: &[CalibrationSample],
        degree: PolynomialDegree,
    ) -> Result<Self, CalibrationError> {
        let m = degree.num_terms();
        if samples.len() < m {
            return Err(CalibrationError::TooFewSamples {
                got: samples.len(),
                min: m,
            });
        }
        let rows: Vec<Vec<Real>> = samples
            .iter()
            .map(|s| {
                let az = s.touch_az();
                degree.terms(az.x, az.y)
            })
            .collect();
        let a = DMatrix::from_fn(samples.len(), m, |i, j| rows[i][j]);
        let bx = DVector::from_iterator(samples.len(), samples.iter().map(|s| s.target_az().x));
        let by = DVector::from_iterator(samples.len(), samples.iter().map(|s| s.target_az().y));

        let svd = a.svd(true, true);
        let solve = |b: &DVector<Real>| {
            svd.solve(b, 1e-12).map_err(|reason| CalibrationError::SolveFailed {
                mode: degree.mode().name(),
                reason: reason.to_string(),
            })
        };
        let cx = solve(&bx)?;
        let cy = solve(&by)?;

        let fitted = Self {
            degree,
            coeff_x: cx.iter().copied().collect(),
            coeff_y: cy.iter().copied().collect(),
        };
        log::debug!(
            "{} correction: rms={:.4} deg",
            degree.mode(),
            rms_error(&fitted, samples).to_degrees()
        );
        Ok(fitted)
    }
}

impl Correction for PolynomialCorrection {
    fn correct(&self, touch: LonLat) -> LonLat {
        let az = touch.to_az();
        let terms = self.degree.terms(az.x, az.y);
        let dot = |c: &[Real]| terms.iter().zip(c).map(|(t, c)| t * c).sum::<Real>();
        az_to_polar(dot(&self.coeff_x), dot(&self.coeff_y))
    }
}
