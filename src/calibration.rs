//! Frame modulation offset calibration

use serde::{Deserialize, Serialize};

/// Gain applied to the modulation input once its offset is removed.
pub const MODULATION_GAIN: i32 = 2;

/// Learned DC offset of the frame modulation input.
///
/// The two-point sampling that produces the offset is done by the caller;
/// this only stores the result and applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CalibrationState {
    dc_offset: i32,
}

impl CalibrationState {
    pub fn new(dc_offset: i32) -> Self {
        Self { dc_offset }
    }

    pub fn calibrate(&mut self, raw_offset: i32) {
        self.dc_offset = raw_offset;
    }

    pub fn dc_offset(&self) -> i32 {
        self.dc_offset
    }

    /// Remove the offset from a raw modulation reading and scale it.
    #[must_use]
    pub fn correct(&self, raw: u16) -> i32 {
        (i32::from(raw) - self.dc_offset).saturating_mul(MODULATION_GAIN)
    }
}
