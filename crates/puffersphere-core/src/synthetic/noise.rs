//! Deterministic touch noise.
//!
//! Keyed hashing instead of a stateful RNG: the same `(target, repetition)`
//! pair always receives the same perturbation regardless of generation order.

use std::f64::consts::TAU;

use crate::{LonLat, Real, spherical_radial};

/// Touch jitter with a uniformly random heading and a distance uniform in
/// `[0, max_abs_rad]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularNoise {
    pub seed: u64,
    /// Largest great-circle displacement, radians.
    pub max_abs_rad: Real,
}

impl AngularNoise {
    pub fn new(seed: u64, max_abs_rad: Real) -> Self {
        Self { seed, max_abs_rad }
    }

    /// `(distance, heading)` of the perturbation for one touch.
    pub fn sample(&self, target_idx: usize, rep_idx: usize) -> (Real, Real) {
        let max_abs = self.max_abs_rad.abs();
        if max_abs == 0.0 {
            return (0.0, 0.0);
        }
        let key = mix_key(self.seed, target_idx, rep_idx);
        let u = unit_interval(splitmix64(key));
        let v = unit_interval(splitmix64(key ^ 0x94D0_49BB_1331_11EB));
        (u * max_abs, v * TAU)
    }

    pub fn apply(&self, target_idx: usize, rep_idx: usize, p: LonLat) -> LonLat {
        let (distance, heading) = self.sample(target_idx, rep_idx);
        if distance == 0.0 {
            return p;
        }
        spherical_radial(p, distance, heading)
    }
}

fn mix_key(seed: u64, target_idx: usize, rep_idx: usize) -> u64 {
    seed ^ (target_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (rep_idx as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Top 53 bits as a double in `[0, 1)`.
fn unit_interval(x: u64) -> Real {
    (x >> 11) as Real * (1.0 / (1u64 << 53) as Real)
}
