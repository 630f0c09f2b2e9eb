//! The per-frame transport payload.

use std::collections::BTreeMap;

use puffersphere_core::{LonLat, Real, TouchId, TuioCoord};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Frame sequence number carried by synthesized stale frames.
pub const STALE_FSEQ: i64 = -2;

/// One complete frame as published by the touch transport:
/// `{"touches": {id: [lon, lat]}, "raw": {id: [x, y]}, "fseq": n, "stale": 0|1, "t": secs}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchFrame {
    #[serde(default)]
    pub touches: BTreeMap<TouchId, [Real; 2]>,
    #[serde(default)]
    pub raw: BTreeMap<TouchId, [Real; 2]>,
    pub fseq: i64,
    /// Non-zero when the transport has no current data.
    #[serde(default)]
    pub stale: u8,
    pub t: Real,
}

impl TouchFrame {
    /// The frame a transport emits after its data timed out.
    pub fn stale(t: Real) -> Self {
        Self {
            touches: BTreeMap::new(),
            raw: BTreeMap::new(),
            fseq: STALE_FSEQ,
            stale: 1,
            t,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale != 0
    }

    /// Reported sphere positions; empty for a stale frame.
    pub fn positions(&self) -> BTreeMap<TouchId, LonLat> {
        if self.is_stale() {
            return BTreeMap::new();
        }
        self.touches.iter().map(|(&id, &p)| (id, LonLat::from(p))).collect()
    }

    /// Raw sensor coordinates; empty for a stale frame.
    pub fn raw_coords(&self) -> BTreeMap<TouchId, TuioCoord> {
        if self.is_stale() {
            return BTreeMap::new();
        }
        self.raw.iter().map(|(&id, &p)| (id, TuioCoord::from(p))).collect()
    }

    pub fn from_json(json: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_transport_payload() {
        let json = r#"{"touches": {"3": [1.5, 0.25]}, "raw": {"3": [0.24, 0.58]}, "fseq": 17, "stale": 0, "t": 2.5}"#;
        let frame = TouchFrame::from_json(json).unwrap();
        assert!(!frame.is_stale());
        assert_eq!(frame.positions()[&3], LonLat::new(1.5, 0.25));
        assert_eq!(frame.raw_coords()[&3], TuioCoord::new(0.24, 0.58));
        assert_eq!(frame.fseq, 17);
    }

    #[test]
    fn stale_frame_has_no_touches() {
        let json = r#"{"touches": {"3": [1.5, 0.25]}, "raw": {"3": [0.24, 0.58]}, "fseq": 17, "stale": 1, "t": 2.5}"#;
        let frame = TouchFrame::from_json(json).unwrap();
        assert!(frame.positions().is_empty());
        assert!(frame.raw_coords().is_empty());

        let json = TouchFrame::stale(4.0).to_json().unwrap();
        let synthesized = TouchFrame::from_json(&json).unwrap();
        assert!(synthesized.is_stale());
        assert_eq!(synthesized.fseq, STALE_FSEQ);
    }

    #[test]
    fn missing_fields_are_errors() {
        assert!(matches!(
            TouchFrame::from_json(r#"{"touches": {}}"#),
            Err(TransportError::Decode(_))
        ));
    }
}
