use puffersphere_core::{LonLat, Real, TouchId, TuioCoord};
use serde::{Deserialize, Serialize};

/// One logical contact, from touch-down until its slot is released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// Transport-assigned id.
    pub id: TouchId,
    /// Lowest free slot at touch-down; reserved until the linger period ends.
    pub slot: usize,
    /// Current position.
    pub lonlat: LonLat,
    /// Position at touch-down.
    pub origin: LonLat,
    /// Latest raw sensor coordinate.
    pub raw: TuioCoord,
    /// Frame time of the touch-down.
    pub created: Real,
    /// Frame time of the last update; the release time once the touch is up.
    pub updated: Real,
    pub fseq: i64,
    /// Time since touch-down at the last drag.
    pub duration: Real,
    /// Time since release, refreshed on every frame while lingering.
    pub dead_time: Real,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TouchEventKind {
    Down,
    Drag,
    Up,
}

/// What happened to a touch in one frame, with a snapshot of the touch.
///
/// Serializes as `{"event": "DOWN", "touch": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "touch", rename_all = "UPPERCASE")]
pub enum TouchEvent {
    Down(Touch),
    Drag(Touch),
    Up(Touch),
}

impl TouchEvent {
    pub fn kind(&self) -> TouchEventKind {
        match self {
            TouchEvent::Down(_) => TouchEventKind::Down,
            TouchEvent::Drag(_) => TouchEventKind::Drag,
            TouchEvent::Up(_) => TouchEventKind::Up,
        }
    }

    pub fn touch(&self) -> &Touch {
        match self {
            TouchEvent::Down(t) | TouchEvent::Drag(t) | TouchEvent::Up(t) => t,
        }
    }

    pub fn into_touch(self) -> Touch {
        match self {
            TouchEvent::Down(t) | TouchEvent::Drag(t) | TouchEvent::Up(t) => t,
        }
    }
}
