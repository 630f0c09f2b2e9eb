//! Guided recording of calibration touches.
//!
//! The recorder walks through a sequence of targets. For each one it waits
//! for a touch to be held for `touch_time` seconds, then records the median
//! raw position of that touch's trace against the current target and moves
//! on. A touch that completed a target is ignored for the rest of its life,
//! so the user has to lift off before the next target can be answered.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::FRAC_PI_2;

use anyhow::{Result, ensure};
use puffersphere_core::{CalibrationSample, LonLat, Real, TouchId, TuioCoord, spiral_layout};
use serde::{Deserialize, Serialize};

use crate::log_io::CalibrationLog;

/// Spiral layouts are regrown at most this many times to reach the target count.
const MAX_LAYOUT_ROUNDS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Unique targets strictly above `min_latitude_deg`.
    pub n_targets: usize,
    pub repetitions: usize,
    /// Southern limit of the target layout, degrees (negative is south).
    pub min_latitude_deg: Real,
    /// How long a touch must be held before it is recorded, seconds.
    pub touch_time: Real,
    /// Leading trace samples dropped before taking the median.
    pub skip_samples: usize,
    /// Repeat each target immediately instead of running the full layout
    /// `repetitions` times.
    pub interleave: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            n_targets: 100,
            repetitions: 3,
            min_latitude_deg: -40.0,
            touch_time: 0.4,
            skip_samples: 2,
            interleave: false,
        }
    }
}

/// At least `n` spiral targets strictly above `min_latitude`.
///
/// The spiral is regrown until enough points fall above the limit, so the
/// result may hold slightly more than `n` targets.
pub fn calibration_targets(n: usize, min_latitude: Real) -> Vec<LonLat> {
    let mut total = n;
    let mut targets = Vec::new();
    for _ in 0..MAX_LAYOUT_ROUNDS {
        targets = spiral_layout(total)
            .into_iter()
            .filter(|p| p.lat > min_latitude)
            .collect();
        if targets.len() >= n {
            break;
        }
        total += n - targets.len();
    }
    targets
}

/// A target answered by a held touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedTarget {
    pub sample: CalibrationSample,
    pub touch_id: TouchId,
    /// Trace length when the touch was accepted.
    pub trace_len: usize,
}

#[derive(Debug, Clone)]
pub struct CalibrationRecorder {
    config: RecorderConfig,
    unique_targets: Vec<LonLat>,
    /// Presentation order, as indices into `unique_targets`.
    sequence: Vec<usize>,
    current: usize,
    started: BTreeMap<TouchId, Real>,
    traces: BTreeMap<TouchId, Vec<TuioCoord>>,
    ignored: BTreeSet<TouchId>,
    samples: Vec<CalibrationSample>,
}

impl CalibrationRecorder {
    pub fn new(config: RecorderConfig) -> Result<Self> {
        ensure!(config.n_targets > 0, "n_targets must be positive");
        ensure!(config.repetitions > 0, "repetitions must be positive");
        ensure!(config.touch_time >= 0.0, "touch_time must be non-negative");
        let min_latitude = config.min_latitude_deg.to_radians();
        ensure!(
            min_latitude < FRAC_PI_2,
            "min_latitude_deg must lie below the north pole, got {}",
            config.min_latitude_deg
        );

        let unique_targets = calibration_targets(config.n_targets, min_latitude);
        ensure!(
            !unique_targets.is_empty(),
            "no targets above {} degrees",
            config.min_latitude_deg
        );
        let n = unique_targets.len();
        let reps = config.repetitions;
        let sequence: Vec<usize> = if config.interleave {
            (0..n).flat_map(|t| std::iter::repeat_n(t, reps)).collect()
        } else {
            (0..reps).flat_map(|_| 0..n).collect()
        };
        log::info!(
            "{} unique targets; {} reps; {} touches total",
            n,
            reps,
            sequence.len()
        );

        Ok(Self {
            config,
            unique_targets,
            sequence,
            current: 0,
            started: BTreeMap::new(),
            traces: BTreeMap::new(),
            ignored: BTreeSet::new(),
            samples: Vec::new(),
        })
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn unique_targets(&self) -> &[LonLat] {
        &self.unique_targets
    }

    /// Target the user should touch now; `None` once complete.
    pub fn current_target(&self) -> Option<LonLat> {
        self.sequence.get(self.current).map(|&i| self.unique_targets[i])
    }

    /// `(completed, total)` presentations.
    pub fn progress(&self) -> (usize, usize) {
        (self.current, self.sequence.len())
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.sequence.len()
    }

    /// Whether some touch is currently being held on the target.
    pub fn is_active(&self) -> bool {
        self.started.keys().any(|id| !self.ignored.contains(id))
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// Feed the raw touches present in one frame at time `t` (seconds).
    ///
    /// Returns the target completed by this frame, if any. At most one
    /// target completes per frame.
    pub fn observe(
        &mut self,
        touches: &BTreeMap<TouchId, TuioCoord>,
        t: Real,
    ) -> Option<RecordedTarget> {
        // forget touches that lifted off
        self.started.retain(|id, _| touches.contains_key(id));
        self.traces.retain(|id, _| touches.contains_key(id));
        self.ignored.retain(|id| touches.contains_key(id));

        if self.is_complete() {
            return None;
        }

        for (&id, &raw) in touches {
            if self.ignored.contains(&id) {
                continue;
            }
            let Some(&start) = self.started.get(&id) else {
                self.started.insert(id, t);
                continue;
            };
            let trace = self.traces.entry(id).or_default();
            trace.push(raw);
            if t - start <= self.config.touch_time {
                continue;
            }

            let settled = trace
                .get(self.config.skip_samples..)
                .filter(|s| !s.is_empty())
                .unwrap_or(&trace[..]);
            let settled_touch = TuioCoord::new(
                median(settled.iter().map(|p| p.x)),
                median(settled.iter().map(|p| p.y)),
            );
            let trace_len = trace.len();
            let target = self.unique_targets[self.sequence[self.current]];
            let sample = CalibrationSample::new(self.current, target, settled_touch);

            log::info!(
                "target {}/{} completed; {} trace points",
                self.current + 1,
                self.sequence.len(),
                trace_len
            );
            self.samples.push(sample);
            self.ignored.insert(id);
            self.current += 1;
            return Some(RecordedTarget {
                sample,
                touch_id: id,
                trace_len,
            });
        }
        None
    }

    /// Recorded samples as a calibration log named `source`.
    pub fn into_log(self, source: impl Into<String>) -> CalibrationLog {
        CalibrationLog::new(source, self.samples)
    }
}

fn median(values: impl Iterator<Item = Real>) -> Real {
    let mut v: Vec<Real> = values.collect();
    if v.is_empty() {
        return Real::NAN;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 0 { 0.5 * (v[mid - 1] + v[mid]) } else { v[mid] }
}
