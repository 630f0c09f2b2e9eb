//! Core math and geometry primitives for `puffersphere`.
//!
//! This crate provides the foundational building blocks used by all other
//! crates in the workspace:
//!
//! - scalar and vector aliases (`Real`, `Vec2`, `Vec3`),
//! - the spherical coordinate algebra: polar, azimuthal-equidistant,
//!   Cartesian and sensor-native (TUIO) coordinates, great-circle distance
//!   and interpolation,
//! - calibration samples (target vs. reported touch),
//! - the [`TouchCalibration`] seam used by the runtime touch path,
//! - deterministic synthetic calibration data for tests and benchmarks.
//!
//! Coordinate conventions: longitude in radians, either `(-π, π]` or
//! `[0, 2π)` depending on the producer; latitude in `[-π/2, π/2]` with the
//! north pole (the projector end of the sphere) at `+π/2`.
//!
//! # Example
//!
//! ```
//! use puffersphere_core::{polar_to_tuio, spherical_distance, tuio_to_polar, LonLat};
//!
//! let p = tuio_to_polar(0.25, 0.75);
//! let raw = polar_to_tuio(p.lon, p.lat);
//! assert!((raw.x - 0.25).abs() < 1e-12);
//! assert!(spherical_distance(p, LonLat::new(p.lon + 0.1, p.lat)) > 0.0);
//! ```

/// Scalar and vector type aliases.
mod math;
/// Spherical coordinate transforms and great-circle helpers.
mod geometry;
/// Calibration samples.
mod sample;
/// Runtime calibration seam.
mod calibration;
/// Deterministic synthetic calibration data.
///
/// Used in workspace tests and can be useful for benchmarking and
/// regression testing of correction models.
pub mod synthetic;

pub use calibration::*;
pub use geometry::*;
pub use math::*;
pub use sample::*;
