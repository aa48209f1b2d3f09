//! Persisted engine state and its fixed-size record format
//!
//! Record layout, little endian:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0   | magic number, `u32` |
//! | 4   | version token, `u16` |
//! | 6   | keyframe count, `u16` |
//! | 8   | 64 keyframes, each `u16` timestamp + 4 × `u16` values |
//! | 648 | 4 channel settings, each `u8` curve + `u8` response |
//! | 656 | DC offset, `i32` |
//! | 660 | feature flags, `u32` |
//! | 664 | zero padding up to [`RECORD_SIZE`] |
//!
//! Unused keyframe slots are written as zeros and ignored on load.

use crate::calibration::CalibrationState;
use crate::curve::EasingCurve;
use crate::error::SnapshotError;
use crate::settings::ChannelSettings;
use crate::store::{Keyframe, KeyframeStore, MAX_KEYFRAMES, NUM_CHANNELS};
use arrayvec::ArrayVec;
use bincode::config::{Configuration, Fixint, LittleEndian};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// "KFRM"
pub const MAGIC_NUMBER: u32 = 0x4B46_524D;

/// Bumped whenever the record layout changes.
pub const VERSION_TOKEN: u16 = 1;

/// Records are padded to a whole number of storage blocks.
pub const STORAGE_BLOCK_SIZE: usize = 256;

/// Bytes actually carrying data.
pub const ENCODED_SIZE: usize = 4
    + 2
    + 2
    + MAX_KEYFRAMES * (2 + 2 * NUM_CHANNELS)
    + NUM_CHANNELS * 2
    + 4
    + 4;

/// Size of one slot record, padding included.
pub const RECORD_SIZE: usize = ENCODED_SIZE.div_ceil(STORAGE_BLOCK_SIZE) * STORAGE_BLOCK_SIZE;

const RECORD_CONFIG: Configuration<LittleEndian, Fixint> = bincode::config::standard()
    .with_little_endian()
    .with_fixed_int_encoding();

/// Complete persisted state of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub keyframes: KeyframeStore,
    pub settings: [ChannelSettings; NUM_CHANNELS],
    pub calibration: CalibrationState,
    /// Caller-owned bits, e.g. alternate operating modes.
    pub feature_flags: u32,
}

#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
struct RawChannelSettings {
    curve: u8,
    response: u8,
}

#[derive(Debug, Encode, Decode)]
struct RawRecord {
    magic_number: u32,
    version_token: u16,
    keyframe_count: u16,
    keyframes: [Keyframe; MAX_KEYFRAMES],
    channel_settings: [RawChannelSettings; NUM_CHANNELS],
    dc_offset: i32,
    feature_flags: u32,
}

impl From<&EngineSnapshot> for RawRecord {
    fn from(snapshot: &EngineSnapshot) -> Self {
        let mut keyframes = [Keyframe::default(); MAX_KEYFRAMES];
        for (slot, keyframe) in keyframes.iter_mut().zip(snapshot.keyframes.iter()) {
            *slot = *keyframe;
        }

        let mut channel_settings = [RawChannelSettings::default(); NUM_CHANNELS];
        for (raw, settings) in channel_settings.iter_mut().zip(&snapshot.settings) {
            raw.curve = settings.easing_curve.into();
            raw.response = settings.response;
        }

        Self {
            magic_number: MAGIC_NUMBER,
            version_token: VERSION_TOKEN,
            keyframe_count: snapshot.keyframes.len() as u16,
            keyframes,
            channel_settings,
            dc_offset: snapshot.calibration.dc_offset(),
            feature_flags: snapshot.feature_flags,
        }
    }
}

impl RawRecord {
    /// Rebuild a snapshot, rejecting the whole record on any inconsistency.
    fn validate(self) -> Option<EngineSnapshot> {
        if self.magic_number != MAGIC_NUMBER || self.version_token != VERSION_TOKEN {
            return None;
        }

        let count = usize::from(self.keyframe_count);
        let stored = self.keyframes.get(..count)?;
        let keyframes: ArrayVec<Keyframe, MAX_KEYFRAMES> = stored.iter().copied().collect();
        let keyframes = KeyframeStore::try_from(keyframes).ok()?;

        let mut settings = [ChannelSettings::default(); NUM_CHANNELS];
        for (slot, raw) in settings.iter_mut().zip(self.channel_settings) {
            let curve = EasingCurve::try_from(raw.curve).ok()?;
            *slot = ChannelSettings::new(curve, raw.response);
        }

        Some(EngineSnapshot {
            keyframes,
            settings,
            calibration: CalibrationState::new(self.dc_offset),
            feature_flags: self.feature_flags,
        })
    }
}

/// Encode a snapshot into one slot record.
pub fn serialize(snapshot: &EngineSnapshot) -> Result<[u8; RECORD_SIZE], SnapshotError> {
    let mut bytes = [0u8; RECORD_SIZE];
    bincode::encode_into_slice(RawRecord::from(snapshot), &mut bytes, RECORD_CONFIG)?;
    Ok(bytes)
}

/// Decode a slot record.
///
/// Returns `None` unless the magic number and version match and every field
/// is consistent: keyframe count in range, timestamps strictly ascending and
/// curve bytes known. Nothing from a rejected record is kept.
pub fn deserialize(bytes: &[u8; RECORD_SIZE]) -> Option<EngineSnapshot> {
    let (record, _): (RawRecord, usize) =
        bincode::decode_from_slice(&bytes[..], RECORD_CONFIG).ok()?;
    record.validate()
}

/// [`deserialize`], falling back to [`EngineSnapshot::default`].
pub fn deserialize_or_default(bytes: &[u8; RECORD_SIZE]) -> EngineSnapshot {
    deserialize(bytes).unwrap_or_default()
}
