//! Touch lifecycle for spherical displays.
//!
//! Transport frames carry the complete set of touches currently on the
//! sphere. [`TouchManager`] diffs consecutive frames into `DOWN`, `DRAG` and
//! `UP` events and hands out small, stable slot numbers that stay reserved
//! for a linger period after a touch ends.
//!
//! [`TouchDriver`] ties a [`TouchSource`] to a manager and an optional
//! [`TouchCalibration`](puffersphere_core::TouchCalibration).
//!
//! ```
//! use std::collections::BTreeMap;
//! use puffersphere_core::{LonLat, TuioCoord};
//! use puffersphere_touch::{TouchEventKind, TouchManager};
//!
//! let mut manager = TouchManager::default();
//! let positions = BTreeMap::from([(1, LonLat::new(0.1, 0.2))]);
//! let raw = BTreeMap::from([(1, TuioCoord::new(0.02, 0.56))]);
//! let events = manager.touch_frame(&positions, &raw, 0, 0.0);
//! assert_eq!(events[0].kind(), TouchEventKind::Down);
//! assert_eq!(events[0].touch().slot, 0);
//! ```

mod driver;
mod error;
mod frame;
mod manager;
mod touch;
mod transport;

pub use driver::TouchDriver;
pub use error::TransportError;
pub use frame::{STALE_FSEQ, TouchFrame};
pub use manager::{TouchManager, TouchManagerConfig};
pub use touch::{Touch, TouchEvent, TouchEventKind};
pub use transport::{FrameQueue, JsonLinesSource, TouchSource};
