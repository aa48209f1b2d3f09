//! # keyframer
//!
//! Keyframe interpolation and persistence engine for four-channel
//! control-voltage modules.
//!
//! This crate provides:
//! - **Easing curves** - Step, linear, quartic in/out, sine and bounce on 16-bit fixed point
//! - **Gain shaping** - Linear/exponential response blend and device output codes
//! - **Keyframe store** - Up to 64 keyframes, sorted and unique by timestamp, no allocation
//! - **Keyframe engine** - Per-channel evaluation, snapping and edit-time navigation
//! - **Persistence** - Versioned fixed-size records that are either fully valid or ignored
//! - **Interrupt-safe navigation** - Position and nearest keyframe published as one atomic word
//!
//! The sine, bounce and exponential laws evaluate `cos`/`powf` from `std`,
//! so targets need a `std` (or libm-backed) float implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyframer::{EasingCurve, KeyframeEngine, NavigationCell};
//!
//! let navigation = NavigationCell::new();
//! let mut engine = KeyframeEngine::new(&navigation);
//!
//! engine.add_keyframe(0, [0, 0, 0, 0]).unwrap();
//! engine.add_keyframe(1000, [65535, 0, 0, 0]).unwrap();
//! engine.set_easing_curve(1, EasingCurve::Sine);
//!
//! let levels = engine.evaluate(500);
//! assert!((32767..=32768).contains(&levels[0]));
//!
//! // The timer interrupt reads the same navigation pair without locking
//! assert_eq!(navigation.load().position, 0);
//! ```
//!
//! ## Saving to a slot
//!
//! ```rust
//! use keyframer::*;
//!
//! let navigation = NavigationCell::new();
//! let mut engine = KeyframeEngine::new(&navigation);
//! engine.add_keyframe(2048, [1, 2, 3, 4]).unwrap();
//! engine.calibrate(-120);
//!
//! let mut bank = SnapshotBank::new(MemoryStorage::new(4));
//! bank.save(2, &engine.snapshot()).unwrap();
//!
//! let restored = KeyframeEngine::from_snapshot(&navigation, bank.load(2).unwrap());
//! assert_eq!(restored.num_keyframes(), 1);
//! assert_eq!(restored.dc_offset(), -120);
//!
//! // A slot that was never written loads as defaults
//! assert_eq!(bank.load(0).unwrap(), EngineSnapshot::default());
//! ```

pub mod calibration;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod gain;
pub mod navigation;
pub mod settings;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod trigger;

pub use calibration::CalibrationState;
pub use config::EngineConfig;
pub use curve::{ease, EasingCurve, FULL_SCALE};
pub use engine::KeyframeEngine;
pub use error::{BankError, CapacityError, SnapshotError, UnknownCurve, UnsortedKeyframes};
pub use gain::GainCodec;
pub use navigation::{Navigation, NavigationCell, Segment, NO_KEYFRAME, NO_POSITION};
pub use settings::ChannelSettings;
pub use snapshot::{EngineSnapshot, RECORD_SIZE};
pub use storage::{MemoryStorage, SlotStorage, SnapshotBank};
pub use store::{InsertOutcome, Keyframe, KeyframeStore, MAX_KEYFRAMES, NUM_CHANNELS};
pub use trigger::TriggerGenerator;

/// Prelude for common imports
pub mod prelude {
    pub use crate::curve::EasingCurve;
    pub use crate::engine::KeyframeEngine;
    pub use crate::navigation::{Navigation, NavigationCell};
    pub use crate::settings::ChannelSettings;
    pub use crate::snapshot::EngineSnapshot;
    pub use crate::storage::{MemoryStorage, SlotStorage, SnapshotBank};
    pub use crate::store::{Keyframe, KeyframeStore};
    pub use crate::trigger::TriggerGenerator;
}
