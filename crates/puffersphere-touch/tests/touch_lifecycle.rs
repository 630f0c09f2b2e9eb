//! Touch lifecycle scenarios driven through whole frames.

use std::collections::BTreeMap;

use puffersphere_core::{LonLat, Real, TouchCalibration, TouchId, TuioCoord};
use puffersphere_touch::{
    FrameQueue, JsonLinesSource, TouchDriver, TouchEvent, TouchEventKind, TouchFrame, TouchManager,
    TouchManagerConfig,
};

fn step(
    m: &mut TouchManager,
    fseq: i64,
    t: Real,
    touches: &[(TouchId, (Real, Real))],
) -> Vec<TouchEvent> {
    let positions: BTreeMap<_, _> = touches.iter().map(|&(id, p)| (id, LonLat::from(p))).collect();
    let raw: BTreeMap<_, _> = positions.iter().map(|(&id, p)| (id, p.to_tuio())).collect();
    m.touch_frame(&positions, &raw, fseq, t)
}

#[test]
fn slot_lingers_after_release() {
    let mut m = TouchManager::new(TouchManagerConfig {
        linger_time: 5.0,
        ..Default::default()
    });

    let events = step(&mut m, 0, 0.0, &[(1, (0.1, 0.2))]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), TouchEventKind::Down);
    assert_eq!(events[0].touch().slot, 0);

    let events = step(&mut m, 1, 0.5, &[(1, (0.11, 0.21))]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), TouchEventKind::Drag);
    assert!((events[0].touch().duration - 0.5).abs() < 1e-9);

    let events = step(&mut m, 2, 1.0, &[]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), TouchEventKind::Up);
    assert!(!events[0].touch().alive);
    assert_eq!(m.graveyard()[&0].id, 1);

    let events = step(&mut m, 3, 2.0, &[(2, (0.3, 0.3))]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), TouchEventKind::Down);
    assert_eq!(events[0].touch().slot, 1);

    let events = step(&mut m, 4, 6.5, &[(2, (0.3, 0.3))]);
    assert_eq!(events[0].kind(), TouchEventKind::Drag);
    assert!(m.graveyard().is_empty());

    let events = step(&mut m, 5, 6.6, &[(2, (0.3, 0.3)), (3, (1.0, 0.0))]);
    let down: Vec<&TouchEvent> = events
        .iter()
        .filter(|e| e.kind() == TouchEventKind::Down)
        .collect();
    assert_eq!(down.len(), 1);
    assert_eq!(down[0].touch().id, 3);
    assert_eq!(down[0].touch().slot, 0);
}

#[test]
fn expiring_slot_is_not_handed_out_in_the_same_frame() {
    let mut m = TouchManager::default();
    step(&mut m, 0, 0.0, &[(1, (0.1, 0.2))]);
    step(&mut m, 1, 1.0, &[]);
    assert!(m.graveyard().contains_key(&0));

    // slot 0 has been dead for 5.5 s when touch 2 lands
    let events = step(&mut m, 2, 6.5, &[(2, (0.4, 0.1))]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), TouchEventKind::Down);
    assert_eq!(events[0].touch().slot, 1);
    assert!(m.graveyard().is_empty());

    let events = step(&mut m, 3, 6.6, &[(2, (0.4, 0.1)), (3, (0.8, 0.1))]);
    let down: Vec<&TouchEvent> = events
        .iter()
        .filter(|e| e.kind() == TouchEventKind::Down)
        .collect();
    assert_eq!(down.len(), 1);
    assert_eq!(down[0].touch().slot, 0);
}

#[test]
fn dead_time_is_measured_from_release() {
    let mut m = TouchManager::default();
    step(&mut m, 0, 0.0, &[(1, (0.0, 0.0))]);
    step(&mut m, 1, 1.0, &[]);
    step(&mut m, 2, 3.5, &[]);
    assert!((m.graveyard()[&0].dead_time - 2.5).abs() < 1e-12);
}

#[test]
fn identical_frames_give_identical_events() {
    let script: Vec<(Real, Vec<(TouchId, (Real, Real))>)> = vec![
        (0.0, vec![(5, (0.0, 0.1)), (2, (1.0, 0.1)), (8, (2.0, 0.1))]),
        (0.1, vec![(2, (1.1, 0.1)), (8, (2.1, 0.1))]),
        (0.2, vec![(9, (3.0, 0.0)), (2, (1.2, 0.1))]),
        (0.3, vec![]),
        (6.0, vec![(11, (0.5, 0.5)), (10, (0.6, 0.5))]),
    ];
    let replay = || {
        let mut m = TouchManager::default();
        script
            .iter()
            .enumerate()
            .flat_map(|(i, (t, touches))| step(&mut m, i as i64, *t, touches))
            .collect::<Vec<_>>()
    };
    let first = replay();
    assert_eq!(first, replay());
    assert!(!first.is_empty());
}

/// Shifts every touch a fixed amount east.
struct EastShift(Real);

impl TouchCalibration for EastShift {
    fn calibrated_touch(&self, raw: TuioCoord) -> LonLat {
        let p = raw.to_polar();
        LonLat::new(p.lon + self.0, p.lat)
    }

    fn min_latitude(&self) -> Option<Real> {
        Some(-0.5)
    }
}

#[test]
fn driver_applies_calibration_to_raw_coordinates() {
    let mut queue = FrameQueue::new();
    queue.push(TouchFrame {
        // reported positions are ignored once calibrated
        touches: BTreeMap::from([(1, [9.0, 9.0]), (2, [9.0, 9.0])]),
        raw: BTreeMap::from([(1, [0.25, 0.5]), (2, [0.25, 0.1])]),
        fseq: 1,
        stale: 0,
        t: 0.0,
    });
    let mut driver = TouchDriver::new(queue).with_calibration(EastShift(0.1));
    assert!(driver.is_calibrated());

    let mut seen = Vec::new();
    driver.tick(|events| seen.extend_from_slice(events)).unwrap();

    // touch 2 sits below the calibrated latitude limit
    assert_eq!(seen.len(), 1);
    let touch = seen[0].touch();
    assert_eq!(touch.id, 1);
    let expected = TuioCoord::new(0.25, 0.5).to_polar();
    assert!((touch.lonlat.lon - (expected.lon + 0.1)).abs() < 1e-12);
    assert!((touch.lonlat.lat - expected.lat).abs() < 1e-12);
    assert_eq!(touch.raw, TuioCoord::new(0.25, 0.5));
}

#[test]
fn json_lines_session_replays_through_the_driver() {
    let lines = [
        r#"{"touches": {"1": [0.5, 0.2]}, "raw": {"1": [0.08, 0.56]}, "fseq": 1, "stale": 0, "t": 0.00}"#,
        r#"{"touches": {"1": [0.6, 0.2]}, "raw": {"1": [0.09, 0.56]}, "fseq": 2, "stale": 0, "t": 0.02}"#,
        r#"{"touches": {}, "raw": {}, "fseq": -2, "stale": 1, "t": 0.50}"#,
    ]
    .join("\n");
    let mut driver = TouchDriver::new(JsonLinesSource::new(lines.as_bytes()));
    let mut kinds = Vec::new();
    let frames = driver
        .tick(|events| kinds.extend(events.iter().map(TouchEvent::kind)))
        .unwrap();

    assert_eq!(frames, 3);
    assert_eq!(kinds, [TouchEventKind::Down, TouchEventKind::Drag, TouchEventKind::Up]);
    assert_eq!(driver.manager().slot_touches().len(), 1);
}
