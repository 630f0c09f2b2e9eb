//! Squared-exponential Gaussian process regression with three outputs.
//!
//! All outputs share one kernel and one set of hyperparameters, so a single
//! Cholesky factorization serves the whole field. Hyperparameters
//! `(length_scale, variance)` maximize the log marginal likelihood summed
//! over the outputs; the search runs in log space with Nelder–Mead, first
//! from the configured initial point and then from seeded random restarts.
//!
//! Outputs are divided by their RMS before fitting, so the kernel variance
//! and the nugget are relative to the size of the data. A 0.5° field and a
//! 5° field of the same shape are corrected equally well.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use puffersphere_core::{Real, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::optimize::{NelderMeadOptions, nelder_mead};
use crate::regression::{Regressor, check_pairs};
use crate::CalibrationError;

/// `variance * exp(-|a - b|² / (2 length_scale²))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquaredExponential {
    pub length_scale: Real,
    pub variance: Real,
}

impl SquaredExponential {
    pub fn eval(&self, a: &Vec3, b: &Vec3) -> Real {
        let d2 = (a - b).norm_squared();
        self.variance * (-0.5 * d2 / (self.length_scale * self.length_scale)).exp()
    }

    fn from_log(theta: &[Real; 2]) -> Self {
        Self {
            length_scale: theta[0].exp(),
            variance: theta[1].exp(),
        }
    }

    fn to_log(self) -> [Real; 2] {
        [self.length_scale.ln(), self.variance.ln()]
    }
}

/// Gaussian process fit options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianProcessOptions {
    /// Initial kernel (and the final one when `optimize` is off).
    pub kernel: SquaredExponential,
    pub length_scale_bounds: (Real, Real),
    pub variance_bounds: (Real, Real),
    /// Added to the kernel diagonal; the assumed measurement noise variance
    /// as a fraction of the output variance.
    pub nugget: Real,
    pub optimize: bool,
    /// Extra hyperparameter searches from random starting points.
    pub n_restarts: usize,
    pub seed: u64,
    pub search: NelderMeadOptions,
}

impl Default for GaussianProcessOptions {
    fn default() -> Self {
        Self {
            kernel: SquaredExponential {
                length_scale: 0.5,
                variance: 1.0,
            },
            length_scale_bounds: (1e-2, 1e1),
            variance_bounds: (1e-6, 1e1),
            nugget: 1e-4,
            optimize: true,
            n_restarts: 10,
            seed: 1_234_567,
            search: NelderMeadOptions::default(),
        }
    }
}

impl GaussianProcessOptions {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let ordered = |(lo, hi): (Real, Real)| lo > 0.0 && lo <= hi && hi.is_finite();
        if !(self.nugget > 0.0 && self.nugget.is_finite()) {
            return Err(CalibrationError::InvalidOption(format!(
                "nugget must be positive, got {}",
                self.nugget
            )));
        }
        if !ordered(self.length_scale_bounds) || !ordered(self.variance_bounds) {
            return Err(CalibrationError::InvalidOption(
                "hyperparameter bounds must be positive and ordered".to_string(),
            ));
        }
        if !(self.kernel.length_scale > 0.0 && self.kernel.variance > 0.0) {
            return Err(CalibrationError::InvalidOption(
                "initial kernel parameters must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn log_bounds(&self) -> [(Real, Real); 2] {
        [
            (self.length_scale_bounds.0.ln(), self.length_scale_bounds.1.ln()),
            (self.variance_bounds.0.ln(), self.variance_bounds.1.ln()),
        ]
    }
}

/// A fitted Gaussian process.
///
/// Stores the training inputs and the dual weights `α = s·(K + nugget·I)⁻¹ (Y / s)`
/// where `s` is the output RMS; prediction is `Σ k(x, xᵢ) αᵢ`. The kernel
/// and the likelihood are in units of `Y / s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianProcess {
    kernel: SquaredExponential,
    nugget: Real,
    output_scale: Real,
    inputs: Vec<Vec3>,
    weights: Vec<Vec3>,
    log_marginal_likelihood: Real,
}

impl GaussianProcess {
    pub fn kernel(&self) -> SquaredExponential {
        self.kernel
    }

    pub fn nugget(&self) -> Real {
        self.nugget
    }

    /// RMS of the training outputs; `1` when they are all zero.
    pub fn output_scale(&self) -> Real {
        self.output_scale
    }

    pub fn log_marginal_likelihood(&self) -> Real {
        self.log_marginal_likelihood
    }

    pub fn num_training_points(&self) -> usize {
        self.inputs.len()
    }
}

struct Solved {
    alpha: DMatrix<Real>,
    log_marginal_likelihood: Real,
}

fn output_scale(outputs: &[Vec3]) -> Real {
    let n = (3 * outputs.len()) as Real;
    let rms = (outputs.iter().map(Vec3::norm_squared).sum::<Real>() / n).sqrt();
    if rms > 0.0 && rms.is_finite() { rms } else { 1.0 }
}

fn outputs_matrix(outputs: &[Vec3], scale: Real) -> DMatrix<Real> {
    DMatrix::from_fn(outputs.len(), 3, |i, j| outputs[i][j] / scale)
}

fn solve(
    kernel: &SquaredExponential,
    nugget: Real,
    inputs: &[Vec3],
    y: &DMatrix<Real>,
) -> Option<Solved> {
    let n = inputs.len();
    let k = DMatrix::from_fn(n, n, |i, j| {
        let v = kernel.eval(&inputs[i], &inputs[j]);
        if i == j { v + nugget } else { v }
    });
    let chol = k.cholesky()?;
    let alpha = chol.solve(y);
    let log_det: Real = 2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<Real>();
    let outputs = y.ncols() as Real;
    let fit = y.component_mul(&alpha).sum();
    let lml = -0.5 * fit - 0.5 * outputs * log_det - 0.5 * outputs * n as Real * (2.0 * PI).ln();
    lml.is_finite().then_some(Solved {
        alpha,
        log_marginal_likelihood: lml,
    })
}

fn optimize_kernel(
    inputs: &[Vec3],
    y: &DMatrix<Real>,
    opts: &GaussianProcessOptions,
) -> SquaredExponential {
    let bounds = opts.log_bounds();
    let objective = |theta: &[Real; 2]| {
        solve(&SquaredExponential::from_log(theta), opts.nugget, inputs, y)
            .map_or(Real::INFINITY, |s| -s.log_marginal_likelihood)
    };

    let mut best = nelder_mead(objective, opts.kernel.to_log(), &bounds, &opts.search);
    let mut rng = StdRng::seed_from_u64(opts.seed);
    for restart in 0..opts.n_restarts {
        let start = [
            rng.random_range(bounds[0].0..=bounds[0].1),
            rng.random_range(bounds[1].0..=bounds[1].1),
        ];
        let candidate = nelder_mead(objective, start, &bounds, &opts.search);
        log::trace!(
            "gp restart {restart}: -lml={:.4} at length_scale={:.4e} variance={:.4e}",
            candidate.value,
            candidate.x[0].exp(),
            candidate.x[1].exp()
        );
        if candidate.value < best.value {
            best = candidate;
        }
    }

    if best.value.is_finite() {
        SquaredExponential::from_log(&best.x)
    } else {
        log::warn!(
            "gp hyperparameter search found no positive-definite kernel; keeping initial kernel"
        );
        opts.kernel
    }
}

impl Regressor for GaussianProcess {
    type Options = GaussianProcessOptions;

    fn fit(
        inputs: &[Vec3],
        outputs: &[Vec3],
        opts: &GaussianProcessOptions,
    ) -> Result<Self, CalibrationError> {
        check_pairs(inputs, outputs)?;
        opts.validate()?;

        let scale = output_scale(outputs);
        let y = outputs_matrix(outputs, scale);
        let kernel = if opts.optimize {
            optimize_kernel(inputs, &y, opts)
        } else {
            opts.kernel
        };
        let solved =
            solve(&kernel, opts.nugget, inputs, &y).ok_or(CalibrationError::SingularKernel {
                length_scale: kernel.length_scale,
                variance: kernel.variance,
                nugget: opts.nugget,
            })?;

        log::debug!(
            "gp fit on {} points: length_scale={:.4e} variance={:.4e} scale={:.4e} lml={:.4}",
            inputs.len(),
            kernel.length_scale,
            kernel.variance,
            scale,
            solved.log_marginal_likelihood
        );

        let alpha = &solved.alpha;
        let weights = (0..inputs.len())
            .map(|i| scale * Vec3::new(alpha[(i, 0)], alpha[(i, 1)], alpha[(i, 2)]))
            .collect();
        Ok(Self {
            kernel,
            nugget: opts.nugget,
            output_scale: scale,
            inputs: inputs.to_vec(),
            weights,
            log_marginal_likelihood: solved.log_marginal_likelihood,
        })
    }

    fn predict(&self, x: &Vec3) -> Vec3 {
        self.inputs
            .iter()
            .zip(&self.weights)
            .fold(Vec3::zeros(), |acc, (xi, wi)| acc + wi * self.kernel.eval(x, xi))
    }
}
