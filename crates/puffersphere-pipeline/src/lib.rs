//! Calibration workflow for spherical touch displays.
//!
//! - [`session`]: a generic session container ([`CalibrationSession`]) whose
//!   problem type fixes the config, input, intermediate state and output,
//! - [`sphere_calibration`]: the touch calibration problem and its step
//!   functions (`step_filter`, `step_fit`, `step_baselines`, `step_finalize`),
//! - [`log_io`]: reading and writing recorded calibration logs (CSV),
//! - [`recorder`]: guided collection of calibration touches,
//! - [`artifact`]: the persisted calibration consumed at runtime.
//!
//! ```no_run
//! use puffersphere_pipeline::session::CalibrationSession;
//! use puffersphere_pipeline::sphere_calibration::{SphereCalibrationProblem, run_calibration};
//! use puffersphere_pipeline::log_io::read_calibration_log;
//! # fn main() -> anyhow::Result<()> {
//! let log = read_calibration_log("calibration/session.csv".as_ref())?;
//! let mut session = CalibrationSession::<SphereCalibrationProblem>::new();
//! session.set_input(log)?;
//! run_calibration(&mut session)?;
//! let artifact = session.export()?;
//! artifact.save("calibration.json".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod log_io;
pub mod recorder;
pub mod session;
pub mod sphere_calibration;

pub use artifact::{BaselineCorrections, CalibrationArtifact};
pub use log_io::{CalibrationLog, latest_log_file, read_calibration_log, write_calibration_log};
pub use recorder::{CalibrationRecorder, RecorderConfig, calibration_targets};
pub use session::{CalibrationSession, ProblemType};
