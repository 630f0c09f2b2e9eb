use nalgebra::{Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components (azimuthal plane coordinates).
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components (unit-sphere Cartesian coordinates).
pub type Vec3 = Vector3<Real>;

/// Transport-assigned touch identifier.
///
/// Ids are opaque to this library; the transport never reuses one while the
/// touch it names is down.
pub type TouchId = i64;
