//! Derivative-free minimizers.
//!
//! Both work on box-bounded problems with a handful of parameters: GP
//! hyperparameters in log space and the one-dimensional radial scale.

use puffersphere_core::Real;
use serde::{Deserialize, Serialize};

/// Options for [`nelder_mead`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadOptions {
    pub max_iters: usize,
    /// Stop once the spread of simplex values drops below this (absolute).
    pub f_tol: Real,
    /// Stop once every vertex is within this distance of the best (per axis).
    pub x_tol: Real,
    /// Edge length of the initial simplex.
    pub initial_step: Real,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            f_tol: 1e-8,
            x_tol: 1e-6,
            initial_step: 1.0,
        }
    }
}

/// Result of a minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum<const N: usize> {
    pub x: [Real; N],
    pub value: Real,
    pub iters: usize,
}

const REFLECT: Real = 1.0;
const EXPAND: Real = 2.0;
const CONTRACT: Real = 0.5;
const SHRINK: Real = 0.5;

/// Nelder–Mead simplex search inside `bounds`.
///
/// Trial points are clamped into the box. `f` may return `+inf` to reject a
/// point; NaN is treated the same way.
pub fn nelder_mead<const N: usize, F>(
    mut f: F,
    start: [Real; N],
    bounds: &[(Real, Real); N],
    opts: &NelderMeadOptions,
) -> Minimum<N>
where
    F: FnMut(&[Real; N]) -> Real,
{
    let clamp = |mut p: [Real; N]| {
        for (x, &(lo, hi)) in p.iter_mut().zip(bounds.iter()) {
            *x = x.clamp(lo, hi);
        }
        p
    };
    let mut eval = |p: &[Real; N]| {
        let v = f(p);
        if v.is_nan() { Real::INFINITY } else { v }
    };

    let x0 = clamp(start);
    let mut simplex: Vec<([Real; N], Real)> = Vec::with_capacity(N + 1);
    simplex.push((x0, eval(&x0)));
    for i in 0..N {
        let mut x = x0;
        let (lo, hi) = bounds[i];
        x[i] = if x0[i] + opts.initial_step <= hi {
            x0[i] + opts.initial_step
        } else {
            (x0[i] - opts.initial_step).max(lo)
        };
        simplex.push((x, eval(&x)));
    }

    let mut iters = 0;
    while iters < opts.max_iters {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best = simplex[0].1;
        let worst = simplex[N].1;
        let spread_x = simplex[1..].iter().all(|(x, _)| {
            x.iter()
                .zip(simplex[0].0.iter())
                .all(|(a, b)| (a - b).abs() <= opts.x_tol)
        });
        if best.is_finite() && ((worst - best).abs() <= opts.f_tol || spread_x) {
            break;
        }
        iters += 1;

        let mut centroid = [0.0; N];
        for (x, _) in &simplex[..N] {
            for (c, xi) in centroid.iter_mut().zip(x.iter()) {
                *c += xi / N as Real;
            }
        }
        let along = |t: Real, from: &[Real; N]| {
            let mut p = centroid;
            for (pi, (c, fi)) in p.iter_mut().zip(centroid.iter().zip(from.iter())) {
                *pi = c + t * (c - fi);
            }
            clamp(p)
        };

        let worst_x = simplex[N].0;
        let reflected = along(REFLECT, &worst_x);
        let f_reflected = eval(&reflected);

        if f_reflected < best {
            let expanded = along(REFLECT * EXPAND, &worst_x);
            let f_expanded = eval(&expanded);
            simplex[N] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }
        if f_reflected < simplex[N - 1].1 {
            simplex[N] = (reflected, f_reflected);
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < worst {
            let p = along(REFLECT * CONTRACT, &worst_x);
            (p, eval(&p))
        } else {
            let p = along(-CONTRACT, &worst_x);
            (p, eval(&p))
        };
        if f_contracted < f_reflected.min(worst) {
            simplex[N] = (contracted, f_contracted);
            continue;
        }

        let best_x = simplex[0].0;
        for (x, v) in simplex.iter_mut().skip(1) {
            for (xi, bi) in x.iter_mut().zip(best_x.iter()) {
                *xi = bi + SHRINK * (*xi - bi);
            }
            *v = eval(&*x);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    Minimum {
        x: simplex[0].0,
        value: simplex[0].1,
        iters,
    }
}

/// Golden-section search for the minimum of a unimodal `f` on `[a, b]`.
///
/// Returns `(x_min, f_min)`.
pub fn golden_section(
    mut f: impl FnMut(Real) -> Real,
    mut a: Real,
    mut b: Real,
    x_tol: Real,
    max_evals: usize,
) -> (Real, Real) {
    const INV_PHI: Real = 0.618_033_988_749_894_9;

    let mut x1 = b - INV_PHI * (b - a);
    let mut x2 = a + INV_PHI * (b - a);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    let mut evals = 2;

    while evals < max_evals && (b - a).abs() > x_tol {
        if f1 < f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = b - INV_PHI * (b - a);
            f1 = f(x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = a + INV_PHI * (b - a);
            f2 = f(x2);
        }
        evals += 1;
    }

    if f1 < f2 { (x1, f1) } else { (x2, f2) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nelder_mead_finds_rosenbrock_minimum() {
        let rosenbrock =
            |p: &[Real; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let opts = NelderMeadOptions {
            max_iters: 2000,
            f_tol: 1e-14,
            x_tol: 1e-10,
            initial_step: 0.5,
        };
        let min = nelder_mead(rosenbrock, [-1.2, 1.0], &[(-5.0, 5.0), (-5.0, 5.0)], &opts);
        assert!((min.x[0] - 1.0).abs() < 1e-3, "{min:?}");
        assert!((min.x[1] - 1.0).abs() < 1e-3, "{min:?}");
    }

    #[test]
    fn nelder_mead_respects_bounds() {
        let f = |p: &[Real; 2]| (p[0] - 10.0).powi(2) + (p[1] + 2.0).powi(2);
        let bounds = [(-1.0, 1.0), (-1.0, 1.0)];
        let min = nelder_mead(f, [0.0, 0.0], &bounds, &NelderMeadOptions::default());
        assert!(min.x[0] <= 1.0 && min.x[0] > 0.99, "{min:?}");
        assert!(min.x[1] >= -1.0 && min.x[1] < -0.99, "{min:?}");
    }

    #[test]
    fn nelder_mead_skips_rejected_points() {
        let f = |p: &[Real; 1]| if p[0] < 0.0 { Real::INFINITY } else { (p[0] - 0.3).powi(2) };
        let min = nelder_mead(f, [2.0], &[(-3.0, 3.0)], &NelderMeadOptions::default());
        assert!((min.x[0] - 0.3).abs() < 1e-3, "{min:?}");
    }

    #[test]
    fn golden_section_parabola() {
        let (x, fx) = golden_section(|x| (x - 1.3).powi(2) + 0.5, 0.0, 2.0, 1e-10, 200);
        assert!((x - 1.3).abs() < 1e-6);
        assert!((fx - 0.5).abs() < 1e-10);
    }
}
