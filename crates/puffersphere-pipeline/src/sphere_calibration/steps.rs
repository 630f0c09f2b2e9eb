//! Step functions for sphere touch calibration.

use anyhow::{Result, anyhow};
use puffersphere_calib::{
    CalibrationModel, ConstantCorrection, CorrectionMode, NoCorrection, PolynomialCorrection,
    PolynomialDegree, evaluate_correction, prepare_training_set,
};

use crate::artifact::{BaselineCorrections, CalibrationArtifact};
use crate::session::{CalibrationSession, current_timestamp};

use super::problem::SphereCalibrationProblem;

type Session = CalibrationSession<SphereCalibrationProblem>;

/// Options for [`step_filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Override the outlier threshold, degrees.
    pub outlier_threshold_deg: Option<f64>,
}

/// Options for [`step_fit`].
#[derive(Debug, Clone, Default)]
pub struct FitStepOptions {
    pub n_restarts: Option<usize>,
    pub seed: Option<u64>,
}

/// Record a failed step in the session log and pass the error on.
fn logged<T>(session: &mut Session, operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        session.log_failure(operation, format!("{e:#}"));
    }
    result
}

/// Drop outliers and group repeated touches.
///
/// # Errors
///
/// Fails with [`CalibrationError::TooFewSamples`](puffersphere_calib::CalibrationError)
/// when too few samples survive.
pub fn step_filter(session: &mut Session, opts: Option<FilterOptions>) -> Result<()> {
    session.validate()?;
    let opts = opts.unwrap_or_default();
    let mut fit_opts = session.config.fit_opts();
    if let Some(threshold) = opts.outlier_threshold_deg {
        fit_opts.outlier_threshold_deg = threshold;
    }

    let input = session.require_input()?;
    let result = prepare_training_set(&input.samples, &fit_opts).map_err(anyhow::Error::from);
    let training = logged(session, "filter", result)?;

    log::info!("{} calibration samples", training.total);
    log::info!(
        "{} excluded as outliers with >= {:.0} degree offset; {} remain",
        training.excluded,
        fit_opts.outlier_threshold_deg,
        training.kept.len()
    );
    log::info!(
        "{} unique targets; {} repeats per target",
        training.unique_targets(),
        training.repeats_per_target()
    );

    let notes = format!(
        "total={}, excluded={}, kept={}, targets={}",
        training.total,
        training.excluded,
        training.kept.len(),
        training.unique_targets()
    );
    session.state.clear_fit();
    session.state.training = Some(training);
    session.clear_output();
    session.log_success_with_notes("filter", notes);
    Ok(())
}

/// Fit the Gaussian-process correction on the filtered training set.
pub fn step_fit(session: &mut Session, opts: Option<FitStepOptions>) -> Result<()> {
    session.validate()?;
    let training = session
        .state
        .training
        .clone()
        .ok_or_else(|| anyhow!("filtering required before fitting"))?;

    let opts = opts.unwrap_or_default();
    let mut fit_opts = session.config.fit_opts();
    if let Some(n) = opts.n_restarts {
        fit_opts.gp.n_restarts = n;
    }
    if let Some(seed) = opts.seed {
        fit_opts.gp.seed = seed;
    }

    let result = CalibrationModel::fit_prepared(&training, &fit_opts).map_err(anyhow::Error::from);
    let model = logged(session, "fit", result)?;

    let diag = model.diagnostics();
    log::info!("RMS error: {:.3} deg", diag.error.rms_deg);
    log::info!("Median error: {:.3} deg", diag.error.median_deg);
    let notes = format!(
        "rms={:.3} deg, median={:.3} deg, raw rms={:.3} deg",
        diag.error.rms_deg, diag.error.median_deg, diag.raw_error.rms_deg
    );

    session.state.errors.insert(CorrectionMode::None, diag.raw_error);
    session.state.errors.insert(CorrectionMode::Gp, diag.error);
    session.state.model = Some(model);
    session.log_success_with_notes("fit", notes);
    Ok(())
}

/// Fit the constant and polynomial baselines and record every mode's error.
pub fn step_baselines(session: &mut Session) -> Result<()> {
    let training = session
        .state
        .training
        .as_ref()
        .ok_or_else(|| anyhow!("filtering required before baselines"))?;
    let kept = &training.kept;

    let result = (|| -> Result<_> {
        let baselines = BaselineCorrections {
            constant: ConstantCorrection::fit(kept)?,
            quadratic: PolynomialCorrection::fit(kept, PolynomialDegree::Quadratic)?,
            cubic: PolynomialCorrection::fit(kept, PolynomialDegree::Cubic)?,
        };
        let errors = [
            (CorrectionMode::None, evaluate_correction(&NoCorrection, kept)?),
            (CorrectionMode::Constant, evaluate_correction(&baselines.constant, kept)?),
            (CorrectionMode::Quadratic, evaluate_correction(&baselines.quadratic, kept)?),
            (CorrectionMode::Cubic, evaluate_correction(&baselines.cubic, kept)?),
        ];
        Ok((baselines, errors))
    })();
    let (baselines, errors) = logged(session, "baselines", result)?;

    let mut notes = Vec::with_capacity(errors.len());
    for (mode, stats) in errors {
        log::info!("{mode}: rms {:.3} deg, median {:.3} deg", stats.rms_deg, stats.median_deg);
        notes.push(format!("{mode}={:.3}", stats.rms_deg));
        session.state.errors.insert(mode, stats);
    }
    session.state.baselines = Some(baselines);
    session.log_success_with_notes("baselines", notes.join(", "));
    Ok(())
}

/// Assemble the artifact from the fitted model and any baselines.
pub fn step_finalize(session: &mut Session) -> Result<()> {
    let input = session.require_input()?;
    let model = session
        .state
        .model
        .clone()
        .ok_or_else(|| anyhow!("fit required before finalizing"))?;

    let expected_rmse = session
        .state
        .errors
        .iter()
        .map(|(mode, stats)| (*mode, stats.rms_deg))
        .collect();
    let artifact = CalibrationArtifact {
        calibration_file: input.source.clone(),
        created_at: current_timestamp(),
        min_latitude: model.min_latitude(),
        model,
        baselines: session.state.baselines.clone(),
        expected_rmse,
    };
    session.set_output(artifact);
    session.log_success("finalize");
    Ok(())
}

/// Filter, fit, optional baselines, finalize.
pub fn run_calibration(session: &mut Session) -> Result<()> {
    step_filter(session, None)?;
    step_fit(session, None)?;
    if session.config.fit_baselines {
        step_baselines(session)?;
    }
    step_finalize(session)
}
