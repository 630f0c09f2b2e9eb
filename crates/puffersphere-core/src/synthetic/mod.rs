//! Synthetic calibration sessions.
//!
//! [`sphere`] builds target layouts and distorted touch samples; [`noise`]
//! supplies deterministic jitter.

pub mod noise;
pub mod sphere;
