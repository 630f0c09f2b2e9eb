use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use puffersphere_calib::CorrectionMode;
use puffersphere_pipeline::sphere_calibration::{
    SphereCalibrationConfig, SphereCalibrationProblem, run_calibration,
};
use puffersphere_pipeline::{
    CalibrationArtifact, CalibrationSession, latest_log_file, read_calibration_log,
};
use tracing::Level;

/// Fit a touch calibration from a recorded calibration log.
#[derive(Debug, Parser)]
#[command(author, version, about = "Spherical touch calibration")]
struct Args {
    /// Calibration log (CSV). Defaults to the newest log in `--dir`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory searched for calibration logs.
    #[arg(long, default_value = "calibration")]
    dir: PathBuf,

    /// Optional JSON SphereCalibrationConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the calibration artifact.
    #[arg(long, default_value = "calibration.json")]
    output: PathBuf,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> Result<SphereCalibrationConfig> {
    let Some(path) = path else {
        return Ok(SphereCalibrationConfig::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid config {}", path.display()))
}

/// Run the calibration and return the session for reporting.
fn calibrate_from_files(
    input: Option<&Path>,
    dir: &Path,
    config: Option<&Path>,
    output: &Path,
) -> Result<CalibrationSession<SphereCalibrationProblem>> {
    let input = match input {
        Some(path) => path.to_path_buf(),
        None => latest_log_file(dir)?,
    };
    tracing::info!("calibrating from {}", input.display());

    let log = read_calibration_log(&input)?;
    let mut session = CalibrationSession::<SphereCalibrationProblem>::with_input(log)?;
    session.set_config(load_config(config)?)?;
    run_calibration(&mut session)?;

    let artifact = session.export()?;
    artifact.save(output)?;
    tracing::info!("wrote calibration to {}", output.display());
    Ok(session)
}

fn format_report(
    session: &CalibrationSession<SphereCalibrationProblem>,
    artifact: &CalibrationArtifact,
) -> Result<String, fmt::Error> {
    let diag = artifact.model.diagnostics();
    let mut out = String::new();
    writeln!(out, "calibration file:   {}", artifact.calibration_file)?;
    writeln!(out, "samples:            {}", diag.total_samples)?;
    writeln!(
        out,
        "excluded outliers:  {} (offset >= {:.0} deg)",
        diag.excluded_outliers, session.config.outlier_threshold_deg
    )?;
    writeln!(out, "used samples:       {}", diag.used_samples)?;
    writeln!(
        out,
        "unique targets:     {} ({} repeats each)",
        diag.unique_targets, diag.repeats_per_target
    )?;
    writeln!(out, "intra-target rms:   {:.3} deg", diag.intra_target_rms_deg)?;
    writeln!(out, "min latitude:       {:.1} deg", artifact.min_latitude.to_degrees())?;
    writeln!(out, "{:<12} {:>10} {:>12}", "mode", "rms (deg)", "median (deg)")?;
    for (mode, stats) in &session.state.errors {
        writeln!(
            out,
            "{:<12} {:>10.3} {:>12.3}",
            mode.name(),
            stats.rms_deg,
            stats.median_deg
        )?;
    }
    writeln!(
        out,
        "expected error:     {:.3} deg rms (gp)",
        artifact.expected_rmse(CorrectionMode::Gp)
    )?;
    Ok(out)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))?;

    let session = calibrate_from_files(
        args.input.as_deref(),
        &args.dir,
        args.config.as_deref(),
        &args.output,
    )?;
    let artifact = session.require_output()?;
    print!("{}", format_report(&session, artifact)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use puffersphere_core::synthetic::noise::AngularNoise;
    use puffersphere_core::synthetic::sphere::{distorted_samples, radial_scale, targets_above};
    use puffersphere_pipeline::write_calibration_log;

    fn write_log(dir: &Path, name: &str) -> usize {
        let targets = targets_above(25, -0.6);
        let noise = AngularNoise::new(3, 0.002);
        let samples = distorted_samples(&targets, 2, radial_scale(1.03), &noise);
        let path = dir.join(name);
        write_calibration_log(fs::File::create(&path).unwrap(), &samples).unwrap();
        samples.len()
    }

    fn fast_config(dir: &Path) -> PathBuf {
        let mut config = SphereCalibrationConfig::default();
        config.gp.n_restarts = 1;
        let path = dir.join("config.json");
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        path
    }

    #[test]
    fn helper_picks_latest_log_and_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let n = write_log(dir.path(), "calibration_1.csv");
        let config = fast_config(dir.path());
        let output = dir.path().join("calibration.json");

        let session = calibrate_from_files(None, dir.path(), Some(&config), &output)
            .expect("cli helper should succeed");
        let artifact = CalibrationArtifact::load(&output).unwrap();
        assert_eq!(artifact.calibration_file, "calibration_1.csv");
        assert_eq!(session.exports.len(), 1);

        let report = format_report(&session, &artifact).unwrap();
        assert!(report.contains(&format!("samples:            {n}\n")), "{report}");
        assert!(report.contains("gp"), "{report}");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("calibration.json");
        assert!(calibrate_from_files(None, dir.path(), None, &output).is_err());
        assert!(!output.exists());
    }
}
