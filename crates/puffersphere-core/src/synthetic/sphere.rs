//! Targets and touches for a simulated sphere.

use crate::synthetic::noise::AngularNoise;
use crate::{CalibrationSample, LonLat, Real, az_to_polar, spiral_layout};

/// Spiral targets strictly above `min_latitude`, north pole first.
pub fn targets_above(n: usize, min_latitude: Real) -> Vec<LonLat> {
    spiral_layout(n)
        .into_iter()
        .filter(|p| p.lat > min_latitude)
        .collect()
}

/// Distortion that scales the azimuthal radius by `scale`.
///
/// `scale > 1` pushes touches away from the north pole, the typical error of
/// a fisheye lens that is slightly out of focus.
pub fn radial_scale(scale: Real) -> impl Fn(LonLat) -> LonLat {
    move |p| {
        let az = p.to_az() * scale;
        az_to_polar(az.x, az.y)
    }
}

/// Distortion that rotates the whole sphere about its axis.
pub fn longitude_offset(offset: Real) -> impl Fn(LonLat) -> LonLat {
    move |p| LonLat::new(p.lon + offset, p.lat).wrapped()
}

/// Smooth, latitude-dependent twist plus a small radial bulge.
pub fn swirl(twist: Real, bulge: Real) -> impl Fn(LonLat) -> LonLat {
    move |p| {
        let t = 0.5 * (1.0 + p.lat.sin());
        LonLat::new(p.lon + twist * (1.0 - t), p.lat - bulge * p.lat.cos()).wrapped()
    }
}

/// One sample per `(target, repetition)`: the target passed through
/// `distort`, jittered by `noise`, then reported in sensor coordinates.
///
/// Sample ids count presentations in the order generated (targets outer,
/// repetitions inner).
pub fn distorted_samples<F>(
    targets: &[LonLat],
    repetitions: usize,
    distort: F,
    noise: &AngularNoise,
) -> Vec<CalibrationSample>
where
    F: Fn(LonLat) -> LonLat,
{
    let mut samples = Vec::with_capacity(targets.len() * repetitions);
    for (target_idx, &target) in targets.iter().enumerate() {
        let touched = distort(target);
        for rep in 0..repetitions {
            let reported = noise.apply(target_idx, rep, touched);
            samples.push(CalibrationSample::new(samples.len(), target, reported.to_tuio()));
        }
    }
    samples
}
