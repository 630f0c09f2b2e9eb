//! Calibration log files.
//!
//! One CSV row per recorded touch, header
//! `id, target_lon, target_lat, tuio_x, tuio_y`, angles in radians. Whitespace
//! around fields and header names is ignored.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use puffersphere_core::{CalibrationSample, Real};
use serde::{Deserialize, Serialize};

/// A recorded calibration session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationLog {
    /// Where the samples came from, usually the log file name.
    pub source: String,
    pub samples: Vec<CalibrationSample>,
}

impl CalibrationLog {
    pub fn new(source: impl Into<String>, samples: Vec<CalibrationSample>) -> Self {
        Self {
            source: source.into(),
            samples,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LogRow {
    id: usize,
    target_lon: Real,
    target_lat: Real,
    tuio_x: Real,
    tuio_y: Real,
}

/// Parse samples from CSV text.
pub fn parse_calibration_log<R: Read>(reader: R) -> Result<Vec<CalibrationSample>> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut samples = Vec::new();
    for (idx, row) in csv.deserialize::<LogRow>().enumerate() {
        let row = row.with_context(|| format!("malformed calibration log row {}", idx + 1))?;
        samples.push(CalibrationSample::from_log_row(
            row.id,
            row.target_lon,
            row.target_lat,
            row.tuio_x,
            row.tuio_y,
        ));
    }
    Ok(samples)
}

/// Read a calibration log file; the log's `source` is the file name.
pub fn read_calibration_log(path: &Path) -> Result<CalibrationLog> {
    let file = File::open(path)
        .with_context(|| format!("failed to open calibration log {}", path.display()))?;
    let samples =
        parse_calibration_log(file).with_context(|| {
            format!("failed to parse calibration log {}", path.display())
        })?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::info!("read {} calibration samples from {}", samples.len(), source);
    Ok(CalibrationLog::new(source, samples))
}

/// Write samples as CSV, header first.
pub fn write_calibration_log<W: Write>(writer: W, samples: &[CalibrationSample]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for s in samples {
        csv.serialize(LogRow {
            id: s.id,
            target_lon: s.target.lon,
            target_lat: s.target.lat,
            tuio_x: s.tuio.x,
            tuio_y: s.tuio.y,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// The most recently modified `.csv` file in `dir`.
pub fn latest_log_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        // ties broken by name so the choice is stable
        let newer = match &newest {
            None => true,
            Some((t, p)) => modified > *t || (modified == *t && path > *p),
        };
        if newer {
            newest = Some((modified, path));
        }
    }
    match newest {
        Some((_, path)) => Ok(path),
        None => bail!("no calibration logs (*.csv) found in {}", dir.display()),
    }
}
