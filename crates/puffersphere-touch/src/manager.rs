//! Frame diffing and slot allocation.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;

use puffersphere_core::{LonLat, Real, TouchId, TuioCoord};
use serde::{Deserialize, Serialize};

use crate::touch::{Touch, TouchEvent};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchManagerConfig {
    /// Seconds a released touch keeps its slot.
    pub linger_time: Real,
    /// Touches at or below this latitude (radians) are ignored.
    pub min_latitude: Real,
}

impl Default for TouchManagerConfig {
    fn default() -> Self {
        Self {
            linger_time: 5.0,
            min_latitude: -PI,
        }
    }
}

/// Turns complete touch frames into `DOWN`/`DRAG`/`UP` events.
///
/// Every frame must list all touches currently present. Ids that appear are
/// touch-downs, ids seen before are drags, and ids that vanished are
/// releases. A released touch moves to the graveyard and holds on to its slot
/// until it has been dead for longer than `linger_time`; only then can a new
/// touch take that slot.
#[derive(Debug, Clone, Default)]
pub struct TouchManager {
    config: TouchManagerConfig,
    touches: BTreeMap<TouchId, Touch>,
    /// Released touches keyed by the slot they hold, so an id that comes
    /// back while still lingering cannot collide with its old entry.
    graveyard: BTreeMap<usize, Touch>,
}

impl TouchManager {
    pub fn new(config: TouchManagerConfig) -> Self {
        Self {
            config,
            touches: BTreeMap::new(),
            graveyard: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TouchManagerConfig {
        &self.config
    }

    pub fn set_min_latitude(&mut self, min_latitude: Real) {
        self.config.min_latitude = min_latitude;
    }

    /// Process one frame at time `t`.
    ///
    /// Events come back grouped as all `DOWN`s, then all `DRAG`s, then all
    /// `UP`s, each group in ascending id order.
    ///
    /// # Panics
    ///
    /// Panics if an id in `positions` has no entry in `raw`. Transports must
    /// deliver both maps for the same ids.
    pub fn touch_frame(
        &mut self,
        positions: &BTreeMap<TouchId, LonLat>,
        raw: &BTreeMap<TouchId, TuioCoord>,
        fseq: i64,
        t: Real,
    ) -> Vec<TouchEvent> {
        let min_latitude = self.config.min_latitude;
        let present: BTreeMap<TouchId, LonLat> = positions
            .iter()
            .filter(|(_, p)| p.lat > min_latitude)
            .map(|(&id, &p)| (id, p))
            .collect();
        let raw_of = |id: TouchId| match raw.get(&id) {
            Some(&r) => r,
            None => {
                panic!("touch frame {fseq} has a position but no raw coordinate for touch {id}")
            }
        };

        let mut down = Vec::new();
        let mut moved = Vec::new();
        for &id in present.keys() {
            if self.touches.contains_key(&id) {
                moved.push(id);
            } else {
                down.push(id);
            }
        }
        let up: Vec<TouchId> = self
            .touches
            .keys()
            .filter(|id| !present.contains_key(id))
            .copied()
            .collect();

        let mut downs = Vec::with_capacity(down.len());
        let mut reserved = self.reserved_slots();
        for id in down {
            let mut slot = 0;
            while reserved.contains(&slot) {
                slot += 1;
            }
            reserved.insert(slot);
            let lonlat = present[&id];
            let touch = Touch {
                id,
                slot,
                lonlat,
                origin: lonlat,
                raw: raw_of(id),
                created: t,
                updated: t,
                fseq,
                duration: 0.0,
                dead_time: 0.0,
                alive: true,
            };
            log::debug!("touch {id} down in slot {slot}");
            self.touches.insert(id, touch);
            downs.push(TouchEvent::Down(touch));
        }

        let mut drags = Vec::with_capacity(moved.len());
        for id in moved {
            let Some(touch) = self.touches.get_mut(&id) else {
                continue;
            };
            touch.lonlat = present[&id];
            touch.raw = raw_of(id);
            touch.updated = t;
            touch.fseq = fseq;
            touch.duration = t - touch.created;
            drags.push(TouchEvent::Drag(*touch));
        }

        let mut ups = Vec::with_capacity(up.len());
        for id in up {
            let Some(mut touch) = self.touches.remove(&id) else {
                continue;
            };
            touch.alive = false;
            touch.updated = t;
            touch.fseq = fseq;
            log::debug!("touch {id} up, slot {} lingering", touch.slot);
            self.graveyard.insert(touch.slot, touch);
            ups.push(TouchEvent::Up(touch));
        }

        self.sweep(t);

        downs.extend(drags);
        downs.extend(ups);
        downs
    }

    fn reserved_slots(&self) -> BTreeSet<usize> {
        self.touches
            .values()
            .map(|t| t.slot)
            .chain(self.graveyard.keys().copied())
            .collect()
    }

    fn sweep(&mut self, t: Real) {
        let linger = self.config.linger_time;
        self.graveyard.retain(|slot, touch| {
            touch.dead_time = t - touch.updated;
            let keep = touch.dead_time <= linger;
            if !keep {
                log::debug!("slot {slot} released by touch {}", touch.id);
            }
            keep
        });
    }

    /// Touches currently on the sphere, by id.
    pub fn live_touches(&self) -> &BTreeMap<TouchId, Touch> {
        &self.touches
    }

    pub fn touch(&self, id: TouchId) -> Option<&Touch> {
        self.touches.get(&id)
    }

    /// Released touches still holding a slot, by slot.
    pub fn graveyard(&self) -> &BTreeMap<usize, Touch> {
        &self.graveyard
    }

    /// Every reserved slot with the touch holding it, live or lingering.
    pub fn slot_touches(&self) -> BTreeMap<usize, &Touch> {
        self.graveyard
            .iter()
            .map(|(&slot, t)| (slot, t))
            .chain(self.touches.values().map(|t| (t.slot, t)))
            .collect()
    }
}
