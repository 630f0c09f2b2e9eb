//! Polling loop glue between a transport and the touch manager.

use std::collections::BTreeMap;

use puffersphere_core::{LonLat, TouchCalibration, TouchId};

use crate::error::TransportError;
use crate::frame::TouchFrame;
use crate::manager::{TouchManager, TouchManagerConfig};
use crate::touch::TouchEvent;
use crate::transport::TouchSource;

/// Owns a frame source and a [`TouchManager`]; call [`tick`](Self::tick) once
/// per rendered frame.
///
/// With a calibration installed, positions are recomputed from each frame's
/// raw coordinates and the calibration's trusted latitude becomes the
/// manager's lower limit.
pub struct TouchDriver<S> {
    source: S,
    manager: TouchManager,
    calibration: Option<Box<dyn TouchCalibration>>,
}

impl<S: TouchSource> TouchDriver<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, TouchManagerConfig::default())
    }

    pub fn with_config(source: S, config: TouchManagerConfig) -> Self {
        Self {
            source,
            manager: TouchManager::new(config),
            calibration: None,
        }
    }

    pub fn with_calibration(mut self, calibration: impl TouchCalibration + 'static) -> Self {
        self.set_calibration(Box::new(calibration));
        self
    }

    pub fn set_calibration(&mut self, calibration: Box<dyn TouchCalibration>) {
        if let Some(min_latitude) = calibration.min_latitude() {
            log::info!("touches below {:.1} degrees ignored", min_latitude.to_degrees());
            self.manager.set_min_latitude(min_latitude);
        }
        self.calibration = Some(calibration);
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn manager(&self) -> &TouchManager {
        &self.manager
    }

    /// Run one frame through the manager.
    pub fn process(&mut self, frame: &TouchFrame) -> Vec<TouchEvent> {
        let raw = frame.raw_coords();
        let positions: BTreeMap<TouchId, LonLat> = match &self.calibration {
            Some(calibration) => raw
                .iter()
                .map(|(&id, &r)| (id, calibration.calibrated_touch(r)))
                .collect(),
            None => frame.positions(),
        };
        if frame.is_stale() {
            log::debug!("stale touch frame at t={:.3}", frame.t);
        }
        self.manager.touch_frame(&positions, &raw, frame.fseq, frame.t)
    }

    /// Drain every waiting frame, passing each non-empty batch of events to
    /// `handler`. Returns the number of frames processed.
    pub fn tick<F>(&mut self, mut handler: F) -> Result<usize, TransportError>
    where
        F: FnMut(&[TouchEvent]),
    {
        let mut frames = 0;
        while let Some(frame) = self.source.poll_frame()? {
            let events = self.process(&frame);
            frames += 1;
            if !events.is_empty() {
                handler(&events);
            }
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::TouchEventKind;
    use crate::transport::FrameQueue;
    use puffersphere_core::{Real, TuioCoord};

    fn frame(fseq: i64, t: Real, touches: &[(TouchId, [Real; 2])]) -> TouchFrame {
        TouchFrame {
            touches: touches
                .iter()
                .map(|&(id, raw)| {
                    let p = TuioCoord::from(raw).to_polar();
                    (id, [p.lon, p.lat])
                })
                .collect(),
            raw: touches.iter().copied().collect(),
            fseq,
            stale: 0,
            t,
        }
    }

    #[test]
    fn stale_frame_releases_everything() {
        let queue: FrameQueue = [
            frame(1, 0.0, &[(1, [0.1, 0.6]), (2, [0.4, 0.7])]),
            TouchFrame::stale(0.5),
        ]
        .into_iter()
        .collect();
        let mut driver = TouchDriver::new(queue);
        let mut batches = Vec::new();
        let n = driver.tick(|events| batches.push(events.to_vec())).unwrap();

        assert_eq!(n, 2);
        assert_eq!(batches.len(), 2);
        assert!(batches[1].iter().all(|e| e.kind() == TouchEventKind::Up));
        assert_eq!(batches[1].len(), 2);
        assert!(driver.manager().live_touches().is_empty());
        assert_eq!(driver.manager().graveyard().len(), 2);
    }

    #[test]
    fn quiet_frames_do_not_reach_the_handler() {
        let queue: FrameQueue = [frame(1, 0.0, &[]), frame(2, 0.1, &[])].into_iter().collect();
        let mut driver = TouchDriver::new(queue);
        let mut calls = 0;
        assert_eq!(driver.tick(|_| calls += 1).unwrap(), 2);
        assert_eq!(calls, 0);
    }
}
