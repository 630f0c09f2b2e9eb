//! Recorded log to persisted artifact, through files.

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fs::File;

use puffersphere_calib::CorrectionMode;
use puffersphere_core::synthetic::noise::AngularNoise;
use puffersphere_core::synthetic::sphere::{distorted_samples, swirl, targets_above};
use puffersphere_core::{TouchCalibration, TuioCoord, spherical_distance};
use puffersphere_pipeline::sphere_calibration::{SphereCalibrationProblem, run_calibration};
use puffersphere_pipeline::{
    CalibrationArtifact, CalibrationRecorder, CalibrationSession, RecorderConfig, latest_log_file,
    read_calibration_log, write_calibration_log,
};

fn calibrate(log: puffersphere_pipeline::CalibrationLog) -> CalibrationArtifact {
    let mut session = CalibrationSession::<SphereCalibrationProblem>::with_input(log).unwrap();
    session.update_config(|c| c.gp.n_restarts = 2).unwrap();
    run_calibration(&mut session).unwrap();
    session.export().unwrap()
}

#[test]
fn csv_log_to_artifact_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let targets = targets_above(50, -0.6);
    let samples = distorted_samples(&targets, 3, swirl(0.04, 0.03), &AngularNoise::new(21, 0.003));

    let path = dir.path().join("calibration_1700000000.csv");
    write_calibration_log(File::create(&path).unwrap(), &samples).unwrap();
    assert_eq!(latest_log_file(dir.path()).unwrap(), path);

    let log = read_calibration_log(&path).unwrap();
    assert_eq!(log.source, "calibration_1700000000.csv");
    assert_eq!(log.samples.len(), samples.len());

    let artifact = calibrate(log);
    assert_eq!(artifact.calibration_file, "calibration_1700000000.csv");
    let gp = artifact.expected_rmse(CorrectionMode::Gp);
    assert!(gp < artifact.expected_rmse(CorrectionMode::None));

    let saved = dir.path().join("calibration.json");
    artifact.save(&saved).unwrap();
    let loaded = CalibrationArtifact::load(&saved).unwrap();

    for &(x, y) in &[(0.0, 0.5), (0.25, 0.75), (0.6, 0.4), (0.99, 0.9), (0.5, 1.0)] {
        let a = artifact.get_calibrated_touch(x, y);
        let b = loaded.get_calibrated_touch(x, y);
        assert!(spherical_distance(a, b) < 1e-9, "({x}, {y}): {a:?} vs {b:?}");
        assert!((0.0..TAU).contains(&a.lon), "lon {} out of range", a.lon);
    }
    assert_eq!(loaded.min_latitude(), Some(artifact.min_latitude));
}

#[test]
fn every_mode_is_available_after_a_full_run() {
    let targets = targets_above(30, -0.5);
    let samples = distorted_samples(&targets, 2, swirl(0.02, 0.0), &AngularNoise::new(4, 0.002));
    let artifact = calibrate(puffersphere_pipeline::CalibrationLog::new("synthetic.csv", samples));

    for mode in CorrectionMode::ALL {
        let p = artifact.get_calibrated_touch_with(mode, 0.3, 0.7).unwrap();
        assert!((0.0..TAU).contains(&p.lon), "{mode}: lon {}", p.lon);
        assert!(artifact.expected_rmse(mode).is_finite(), "{mode}");
    }
}

#[test]
fn recorder_session_feeds_the_calibration() {
    let config = RecorderConfig {
        n_targets: 12,
        repetitions: 2,
        ..Default::default()
    };
    let mut recorder = CalibrationRecorder::new(config).unwrap();
    let distort = swirl(0.03, 0.02);

    let mut t = 0.0;
    let mut id = 0;
    while let Some(target) = recorder.current_target() {
        let raw: TuioCoord = distort(target).to_tuio();
        loop {
            t += 1.0 / 60.0;
            if recorder.observe(&BTreeMap::from([(id, raw)]), t).is_some() {
                break;
            }
        }
        recorder.observe(&BTreeMap::new(), t + 0.1);
        t += 0.2;
        id += 1;
    }
    let (done, total) = recorder.progress();
    assert_eq!(done, total);

    let artifact = calibrate(recorder.into_log("calibration_recorded.csv"));
    assert!(artifact.model.diagnostics().unique_targets >= 12);
    assert_eq!(artifact.model.diagnostics().repeats_per_target, 2);
}
