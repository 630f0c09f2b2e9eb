use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::{Real, Vec2, Vec3};

/// Below this `sin(d)` two points are treated as coincident or antipodal.
const GREAT_CIRCLE_EPS: Real = 1e-12;

/// Golden-angle style step of the spiral point set.
const SPIRAL_STEP: Real = 3.6;

/// A point on the sphere in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: Real,
    pub lat: Real,
}

impl LonLat {
    pub const fn new(lon: Real, lat: Real) -> Self {
        Self { lon, lat }
    }

    /// Unit-sphere Cartesian position.
    pub fn to_cartesian(self) -> Vec3 {
        polar_to_cartesian(self.lon, self.lat)
    }

    /// Azimuthal-equidistant position centred on the north pole.
    pub fn to_az(self) -> Vec2 {
        polar_to_az(self.lon, self.lat)
    }

    /// Sensor-native coordinate of this point.
    pub fn to_tuio(self) -> TuioCoord {
        polar_to_tuio(self.lon, self.lat)
    }

    /// Same point with longitude in `(-π, π]`.
    pub fn wrapped(self) -> Self {
        Self::new(wrap_pi(self.lon), self.lat)
    }

    pub fn to_degrees(self) -> (Real, Real) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

impl From<(Real, Real)> for LonLat {
    fn from((lon, lat): (Real, Real)) -> Self {
        Self::new(lon, lat)
    }
}

impl From<[Real; 2]> for LonLat {
    fn from([lon, lat]: [Real; 2]) -> Self {
        Self::new(lon, lat)
    }
}

/// Sensor-native touch position normalized to `[0, 1] x [0, 1]`.
///
/// `x` runs once around the sphere in longitude, `y` runs from the south
/// pole (`0`) to the north pole (`1`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TuioCoord {
    pub x: Real,
    pub y: Real,
}

impl TuioCoord {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn to_polar(self) -> LonLat {
        tuio_to_polar(self.x, self.y)
    }
}

impl From<(Real, Real)> for TuioCoord {
    fn from((x, y): (Real, Real)) -> Self {
        Self::new(x, y)
    }
}

impl From<[Real; 2]> for TuioCoord {
    fn from([x, y]: [Real; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_pi(angle: Real) -> Real {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI { PI } else { wrapped }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_two_pi(angle: Real) -> Real {
    if (0.0..TAU).contains(&angle) {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

pub fn tuio_to_polar(x: Real, y: Real) -> LonLat {
    LonLat::new(x * TAU, PI * y - FRAC_PI_2)
}

pub fn polar_to_tuio(lon: Real, lat: Real) -> TuioCoord {
    TuioCoord::new(wrap_two_pi(lon) / TAU, (lat + FRAC_PI_2) / PI)
}

/// Azimuthal-equidistant projection centred on the north pole.
///
/// The radius is `(π/2 - lat) / π`, so the pole maps to the origin and the
/// south pole to the unit circle.
pub fn polar_to_az(lon: Real, lat: Real) -> Vec2 {
    let r = (FRAC_PI_2 - lat) / PI;
    Vec2::new(r * lon.cos(), r * lon.sin())
}

/// Inverse of [`polar_to_az`]. At the origin the longitude is `0`.
pub fn az_to_polar(x: Real, y: Real) -> LonLat {
    let r = x.hypot(y);
    LonLat::new(y.atan2(x), FRAC_PI_2 - PI * r)
}

pub fn polar_to_cartesian(lon: Real, lat: Real) -> Vec3 {
    let cos_lat = lat.cos();
    Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
}

/// Polar coordinates of the direction of `v`.
///
/// Non-unit vectors are projected radially onto the sphere. The zero vector
/// maps to `(0, 0)`.
pub fn cartesian_to_polar(v: &Vec3) -> LonLat {
    let horizontal = v.x.hypot(v.y);
    LonLat::new(v.y.atan2(v.x), v.z.atan2(horizontal))
}

/// Great-circle distance (haversine), in `[0, π]`.
pub fn spherical_distance(p1: LonLat, p2: LonLat) -> Real {
    let half_dlat = 0.5 * (p2.lat - p1.lat);
    let half_dlon = 0.5 * (p2.lon - p1.lon);
    let a = half_dlat.sin().powi(2) + p1.lat.cos() * p2.lat.cos() * half_dlon.sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Point at fraction `f` along the great circle from `p1` to `p2`.
///
/// Returns `None` when the great circle is undefined: the points coincide
/// (including longitudes that differ by a full turn) or are antipodal.
pub fn spherical_interpolate(p1: LonLat, p2: LonLat, f: Real) -> Option<LonLat> {
    let d = spherical_distance(p1, p2);
    let sin_d = d.sin();
    if sin_d.abs() < GREAT_CIRCLE_EPS {
        return None;
    }
    let a = ((1.0 - f) * d).sin() / sin_d;
    let b = (f * d).sin() / sin_d;
    let v = p1.to_cartesian() * a + p2.to_cartesian() * b;
    Some(cartesian_to_polar(&v))
}

/// `n` evenly spaced points from `p1` to `p2` inclusive.
pub fn spherical_line(p1: LonLat, p2: LonLat, n: usize) -> Vec<LonLat> {
    match n {
        0 => Vec::new(),
        1 => spherical_interpolate(p1, p2, 0.0).into_iter().collect(),
        _ => {
            let last = (n - 1) as Real;
            (0..n)
                .map_while(|i| spherical_interpolate(p1, p2, i as Real / last))
                .collect()
        }
    }
}

pub fn spherical_midpoint(p1: LonLat, p2: LonLat) -> Option<LonLat> {
    spherical_interpolate(p1, p2, 0.5)
}

/// Initial heading from `p1` towards `p2`, clockwise from north, in `(-π, π]`.
///
/// From a pole every direction is the same: `π` (south) at the north pole,
/// `0` (north) at the south pole.
pub fn spherical_course(p1: LonLat, p2: LonLat) -> Real {
    if p1.lat.cos() < GREAT_CIRCLE_EPS {
        return if p1.lat > 0.0 { PI } else { 0.0 };
    }
    let dlon = p2.lon - p1.lon;
    let y = dlon.sin() * p2.lat.cos();
    let x = p1.lat.cos() * p2.lat.sin() - p1.lat.sin() * p2.lat.cos() * dlon.cos();
    wrap_pi(y.atan2(x))
}

/// Destination after travelling `distance` radians from `p` on heading
/// `course` (clockwise from north).
pub fn spherical_radial(p: LonLat, distance: Real, course: Real) -> LonLat {
    let (sin_lat, cos_lat) = p.lat.sin_cos();
    let (sin_d, cos_d) = distance.sin_cos();
    let lat = (sin_lat * cos_d + cos_lat * sin_d * course.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let dlon = (course.sin() * sin_d * cos_lat).atan2(cos_d - sin_lat * lat.sin());
    LonLat::new(wrap_pi(p.lon + dlon), lat)
}

/// Roughly uniform spiral of `n` points from the north pole to the south pole.
pub fn spiral_layout(n: usize) -> Vec<LonLat> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![LonLat::new(0.0, FRAC_PI_2)];
    }
    let count = n as Real;
    let mut theta: Real = 0.0;
    let mut points = Vec::with_capacity(n);
    for k in 0..n {
        let h = 2.0 * k as Real / (count - 1.0) - 1.0;
        let phi = h.clamp(-1.0, 1.0).acos();
        theta = if k == 0 || k == n - 1 {
            0.0
        } else {
            theta + SPIRAL_STEP / (count * (1.0 - h * h)).sqrt()
        };
        points.push(LonLat::new(wrap_pi(theta), phi - FRAC_PI_2));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Real, b: Real, tol: Real) -> bool {
        (a - b).abs() <= tol
    }

    fn grid() -> Vec<LonLat> {
        let mut points = Vec::new();
        for i in 0..24 {
            for j in 0..=12 {
                let lon = -PI + (i as Real + 1.0) * TAU / 24.0;
                let lat = -FRAC_PI_2 + j as Real * PI / 12.0;
                points.push(LonLat::new(lon, lat));
            }
        }
        points
    }

    #[test]
    fn tuio_round_trip() {
        for p in grid() {
            let raw = polar_to_tuio(p.lon, p.lat);
            assert!((0.0..1.0).contains(&raw.x));
            let back = raw.to_polar().wrapped();
            assert!(approx_eq(wrap_pi(back.lon - p.lon), 0.0, 1e-9), "{p:?} -> {back:?}");
            assert!(approx_eq(back.lat, p.lat, 1e-9));
        }
    }

    #[test]
    fn az_round_trip_away_from_pole() {
        for p in grid().into_iter().filter(|p| p.lat < FRAC_PI_2 - 1e-6) {
            let az = polar_to_az(p.lon, p.lat);
            let back = az_to_polar(az.x, az.y);
            assert!(approx_eq(wrap_pi(back.lon - p.lon), 0.0, 1e-9), "{p:?} -> {back:?}");
            assert!(approx_eq(back.lat, p.lat, 1e-9));
        }
    }

    #[test]
    fn az_origin_is_the_pole() {
        let p = az_to_polar(0.0, 0.0);
        assert_eq!(p.lon, 0.0);
        assert!(approx_eq(p.lat, FRAC_PI_2, 1e-15));
    }

    #[test]
    fn cartesian_round_trip_and_scale_invariance() {
        for p in grid().into_iter().filter(|p| p.lat.abs() < FRAC_PI_2 - 1e-6) {
            let v = p.to_cartesian();
            assert!(approx_eq(v.norm(), 1.0, 1e-12));
            let back = cartesian_to_polar(&(v * 3.5));
            assert!(approx_eq(wrap_pi(back.lon - p.lon), 0.0, 1e-9));
            assert!(approx_eq(back.lat, p.lat, 1e-9));
        }
        assert_eq!(cartesian_to_polar(&Vec3::zeros()), LonLat::new(0.0, 0.0));
    }

    #[test]
    fn distance_is_a_symmetric_metric() {
        let points = grid();
        for (i, &a) in points.iter().enumerate().step_by(7) {
            assert_eq!(spherical_distance(a, a), 0.0);
            for &b in points.iter().skip(i).step_by(11) {
                let d = spherical_distance(a, b);
                assert!((0.0..=PI + 1e-12).contains(&d));
                assert!(approx_eq(d, spherical_distance(b, a), 1e-12));
            }
        }
        let quarter = spherical_distance(LonLat::new(0.0, 0.0), LonLat::new(0.0, FRAC_PI_2));
        assert!(approx_eq(quarter, FRAC_PI_2, 1e-12));
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let a = LonLat::new(0.2, 0.3);
        let b = LonLat::new(-1.1, 0.9);
        let start = spherical_interpolate(a, b, 0.0).unwrap();
        let end = spherical_interpolate(a, b, 1.0).unwrap();
        assert!(spherical_distance(start, a) < 1e-9);
        assert!(spherical_distance(end, b) < 1e-9);

        let mid = spherical_midpoint(a, b).unwrap();
        let half = 0.5 * spherical_distance(a, b);
        assert!(approx_eq(spherical_distance(a, mid), half, 1e-9));
        assert!(approx_eq(spherical_distance(mid, b), half, 1e-9));
    }

    #[test]
    fn interpolate_undefined_cases() {
        let a = LonLat::new(0.5, 0.1);
        assert!(spherical_interpolate(a, a, 0.5).is_none());
        assert!(spherical_interpolate(a, LonLat::new(0.5 + TAU, 0.1), 0.5).is_none());
        assert!(spherical_interpolate(a, LonLat::new(0.5 - PI, -0.1), 0.5).is_none());
        assert!(spherical_line(a, a, 4).is_empty());
    }

    #[test]
    fn line_is_evenly_spaced() {
        let a = LonLat::new(-0.4, -0.2);
        let b = LonLat::new(1.3, 0.6);
        let line = spherical_line(a, b, 5);
        assert_eq!(line.len(), 5);
        let step = spherical_distance(a, b) / 4.0;
        for pair in line.windows(2) {
            assert!(approx_eq(spherical_distance(pair[0], pair[1]), step, 1e-9));
        }
        assert_eq!(spherical_line(a, b, 1).len(), 1);
        assert!(spherical_line(a, b, 0).is_empty());
    }

    #[test]
    fn radial_inverts_course() {
        let p = LonLat::new(0.7, -0.3);
        for &course in &[0.0, 0.5, 1.5, -2.0, 3.0] {
            let q = spherical_radial(p, 0.4, course);
            assert!(approx_eq(spherical_distance(p, q), 0.4, 1e-9));
            assert!(approx_eq(wrap_pi(spherical_course(p, q) - course), 0.0, 1e-9));
        }
        let north = LonLat::new(0.0, FRAC_PI_2);
        assert_eq!(spherical_course(north, LonLat::new(1.0, 0.0)), PI);
    }

    #[test]
    fn spiral_covers_both_poles() {
        let points = spiral_layout(50);
        assert_eq!(points.len(), 50);
        assert!(approx_eq(points[0].lat, FRAC_PI_2, 1e-12));
        assert!(approx_eq(points[49].lat, -FRAC_PI_2, 1e-12));
        assert!(points.windows(2).all(|w| w[1].lat < w[0].lat));
        assert!(spiral_layout(0).is_empty());
        assert_eq!(spiral_layout(1).len(), 1);
    }

    #[test]
    fn wrapping_ranges() {
        assert!(approx_eq(wrap_pi(3.0 * PI), PI, 1e-12));
        assert!(approx_eq(wrap_pi(-0.5), -0.5, 1e-12));
        assert_eq!(wrap_two_pi(-1e-20), 0.0);
        assert!(approx_eq(wrap_two_pi(-FRAC_PI_2), 1.5 * PI, 1e-12));
    }

    #[test]
    fn lonlat_serializes_as_struct() {
        let json = serde_json::to_string(&LonLat::new(0.5, -0.25)).unwrap();
        assert_eq!(json, r#"{"lon":0.5,"lat":-0.25}"#);
    }
}
