//! Session framework.
//!
//! A session is a mutable container that step functions advance in place:
//!
//! ```no_run
//! use puffersphere_pipeline::session::CalibrationSession;
//! use puffersphere_pipeline::sphere_calibration::{
//!     SphereCalibrationProblem, step_filter, step_fit,
//! };
//! # fn main() -> anyhow::Result<()> {
//! # let log = unimplemented!();
//! let mut session = CalibrationSession::<SphereCalibrationProblem>::new();
//! session.set_input(log)?;
//! step_filter(&mut session, None)?;
//! step_fit(&mut session, None)?;
//! # Ok(())
//! # }
//! ```

pub mod calibsession;
pub mod problem_type;
pub mod types;

pub use calibsession::CalibrationSession;
pub use problem_type::{InvalidationPolicy, ProblemType};
pub use types::{ExportRecord, LogEntry, SessionMetadata, current_timestamp};
