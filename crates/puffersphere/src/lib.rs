//! Touch calibration and touch tracking for spherical displays.
//!
//! A spherical display reports raw touches in normalized sensor coordinates
//! (TUIO). This crate turns them into calibrated sphere positions and a
//! stream of `DOWN`/`DRAG`/`UP` events:
//!
//! 1. record a calibration log, either with [`pipeline::CalibrationRecorder`]
//!    or from an existing CSV file,
//! 2. fit it with a [`session::CalibrationSession`] of the
//!    [`SphereCalibrationProblem`](session::SphereCalibrationProblem),
//! 3. save the resulting [`CalibrationArtifact`](pipeline::CalibrationArtifact)
//!    and load it at startup,
//! 4. install it on a [`touch::TouchDriver`] and call `tick` every frame.
//!
//! ```no_run
//! use puffersphere::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let calibration = CalibrationArtifact::load("calibration.json".as_ref())?;
//! let frames = JsonLinesSource::new(std::io::stdin().lock());
//! let mut driver = TouchDriver::new(frames).with_calibration(calibration);
//! driver.tick(|events| {
//!     for event in events {
//!         println!("{:?} slot {}", event.kind(), event.touch().slot);
//!     }
//! })?;
//! # Ok(())
//! # }
//! ```

/// Coordinates, spherical geometry and calibration samples.
pub mod core {
    pub use puffersphere_core::*;
}

/// The Gaussian-process calibration model and baseline corrections.
pub mod calib {
    pub use puffersphere_calib::*;
}

/// Session framework and the sphere calibration problem.
pub mod session {
    pub use puffersphere_pipeline::session::{
        CalibrationSession, ExportRecord, InvalidationPolicy, LogEntry, ProblemType,
        SessionMetadata,
    };
    pub use puffersphere_pipeline::sphere_calibration::*;
}

/// Calibration logs, guided recording and the persisted artifact.
pub mod pipeline {
    pub use puffersphere_pipeline::log_io::parse_calibration_log;
    pub use puffersphere_pipeline::recorder::RecordedTarget;
    pub use puffersphere_pipeline::{
        BaselineCorrections, CalibrationArtifact, CalibrationLog, CalibrationRecorder,
        RecorderConfig, calibration_targets, latest_log_file, read_calibration_log, write_calibration_log,
    };
}

/// Touch lifecycle and frame transport.
pub mod touch {
    pub use puffersphere_touch::*;
}

/// `use puffersphere::prelude::*;` for the common path.
pub mod prelude {
    pub use crate::core::{CalibrationSample, LonLat, Real, TouchCalibration, TouchId, TuioCoord};

    pub use crate::calib::{CalibrationModel, CorrectionMode, FitOptions};

    pub use crate::session::{
        CalibrationSession, SphereCalibrationConfig, SphereCalibrationProblem, run_calibration,
    };

    pub use crate::pipeline::{
        CalibrationArtifact, CalibrationLog, CalibrationRecorder, read_calibration_log,
    };

    pub use crate::touch::{
        JsonLinesSource, Touch, TouchDriver, TouchEvent, TouchEventKind, TouchFrame, TouchManager,
        TouchManagerConfig,
    };
}
