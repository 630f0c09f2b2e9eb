//! The trait a calibration problem implements to live in a session.

use std::fmt::Debug;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Which session fields to drop when input or config is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidationPolicy {
    pub clear_state: bool,
    pub clear_output: bool,
    pub clear_exports: bool,
}

impl InvalidationPolicy {
    pub const KEEP_ALL: Self = Self {
        clear_state: false,
        clear_output: false,
        clear_exports: false,
    };

    /// Drop intermediate state and output; keep past exports.
    pub const CLEAR_COMPUTED: Self = Self {
        clear_state: true,
        clear_output: true,
        clear_exports: false,
    };
}

/// A calibration problem: its data types, identity and validation hooks.
///
/// The work itself lives in free step functions taking
/// `&mut CalibrationSession<Self>`, so each step can have its own options and
/// callers can run, skip or repeat steps.
pub trait ProblemType: Sized + 'static {
    /// Tunables. `Default` must be a usable configuration.
    type Config: Clone + Default + Serialize + DeserializeOwned + Debug;
    /// Recorded observations.
    type Input: Clone + Serialize + DeserializeOwned + Debug;
    /// Intermediate results shared between steps.
    type State: Clone + Default + Serialize + DeserializeOwned + Debug;
    /// Final result.
    type Output: Clone + Serialize + DeserializeOwned + Debug;
    /// What leaves the session; may equal `Output`.
    type Export: Clone + Serialize + DeserializeOwned + Debug;

    /// Stable snake_case identifier stored in session files.
    fn name() -> &'static str;

    /// Sessions written by a newer schema are rejected on load.
    fn schema_version() -> u32 {
        1
    }

    fn validate_input(_input: &Self::Input) -> Result<()> {
        Ok(())
    }

    fn validate_config(_config: &Self::Config) -> Result<()> {
        Ok(())
    }

    fn on_input_change() -> InvalidationPolicy {
        InvalidationPolicy::CLEAR_COMPUTED
    }

    fn on_config_change() -> InvalidationPolicy {
        InvalidationPolicy::KEEP_ALL
    }

    fn export(output: &Self::Output, config: &Self::Config) -> Result<Self::Export>;
}
