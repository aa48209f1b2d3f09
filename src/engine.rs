//! Keyframe engine
//!
//! Composes the keyframe store, per-channel settings, calibration and
//! feature flags, evaluates channel levels for a play-head timestamp and
//! publishes the navigation pair read by the timer interrupt.
//!
//! Evaluation is a pure function of the timestamp and the stored data: it
//! never fails, never allocates, and returns identical results for identical
//! inputs.

use crate::calibration::CalibrationState;
use crate::config::EngineConfig;
use crate::curve::{EasingCurve, FULL_SCALE};
use crate::error::CapacityError;
use crate::gain::GainCodec;
use crate::navigation::{Navigation, NavigationCell, Segment};
use crate::settings::ChannelSettings;
use crate::snapshot::EngineSnapshot;
use crate::store::{InsertOutcome, Keyframe, KeyframeStore, NUM_CHANNELS};

/// Keyframe interpolation engine, owned by the main loop.
///
/// The interrupt side shares only the [`NavigationCell`] passed at
/// construction.
#[derive(Debug)]
pub struct KeyframeEngine<'n> {
    store: KeyframeStore,
    settings: [ChannelSettings; NUM_CHANNELS],
    calibration: CalibrationState,
    feature_flags: u32,
    immediate: [u16; NUM_CHANNELS],
    levels: [u16; NUM_CHANNELS],
    segment: Segment,
    nearest: Option<usize>,
    config: EngineConfig,
    navigation: &'n NavigationCell,
}

impl<'n> KeyframeEngine<'n> {
    pub fn new(navigation: &'n NavigationCell) -> Self {
        Self::with_config(navigation, EngineConfig::default())
    }

    pub fn with_config(navigation: &'n NavigationCell, config: EngineConfig) -> Self {
        navigation.publish(Navigation::IDLE);
        Self {
            store: KeyframeStore::new(),
            settings: [ChannelSettings::default(); NUM_CHANNELS],
            calibration: CalibrationState::default(),
            feature_flags: 0,
            immediate: [0; NUM_CHANNELS],
            levels: [0; NUM_CHANNELS],
            segment: Segment::Empty,
            nearest: None,
            config,
            navigation,
        }
    }

    /// Build an engine from persisted state.
    pub fn from_snapshot(navigation: &'n NavigationCell, snapshot: EngineSnapshot) -> Self {
        let mut engine = Self::new(navigation);
        engine.restore(snapshot);
        engine
    }

    // ==================== Evaluation ====================

    /// Compute every channel level for `timestamp`.
    ///
    /// Timestamps outside `0..=65535` are clamped. Also refreshes and
    /// publishes the segment and nearest keyframe.
    pub fn evaluate(&mut self, timestamp: i32) -> [u16; NUM_CHANNELS] {
        let timestamp = timestamp.clamp(0, i32::from(FULL_SCALE)) as u16;

        let (segment, levels) = self.interpolate(timestamp);
        self.segment = segment;
        self.levels = levels;
        self.nearest = self.store.nearest_within(timestamp, self.config.snap_tolerance);
        self.navigation.publish(Navigation::new(self.segment, self.nearest));

        self.levels
    }

    fn interpolate(&self, timestamp: u16) -> (Segment, [u16; NUM_CHANNELS]) {
        let count = self.store.len();
        let upper = self.store.upper_bound(timestamp);

        match (self.store.get(upper.wrapping_sub(1)), self.store.get(upper)) {
            (None, None) => (Segment::Empty, self.immediate),
            (None, Some(first)) => (Segment::BeforeFirst, first.values),
            (Some(last), None) => (Segment::AfterLast(count - 1), last.values),
            (Some(a), Some(b)) => {
                let span = u32::from(b.timestamp - a.timestamp);
                let elapsed = u32::from(timestamp - a.timestamp);
                let progress = (elapsed * u32::from(FULL_SCALE) / span) as u16;

                let mut levels = [0; NUM_CHANNELS];
                for (channel, level) in levels.iter_mut().enumerate() {
                    let settings = &self.settings[channel];
                    let eased = settings.easing_curve.ease(
                        a.values[channel],
                        b.values[channel],
                        progress,
                    );
                    *level = settings.shape(eased);
                }
                (Segment::Between(upper - 1), levels)
            }
        }
    }

    /// Preview value cycling `0 -> 65535 -> 0` once per animation period.
    ///
    /// Follows the channel's easing curve when `use_easing_curve` is set,
    /// else its response law applied to a linear ramp. Used while the
    /// channel's settings are being edited.
    pub fn sample_animation(&self, channel: usize, tick: u32, use_easing_curve: bool) -> u16 {
        let Some(settings) = self.settings(channel) else {
            return 0;
        };

        let period = self.config.animation_period.max(2);
        let phase = tick % period;
        let half = period / 2;
        let (from, to, elapsed, length) = if phase < half {
            (0, FULL_SCALE, phase, half)
        } else {
            (FULL_SCALE, 0, phase - half, period - half)
        };
        let progress = if length <= 1 {
            FULL_SCALE
        } else {
            (u64::from(elapsed) * u64::from(FULL_SCALE) / u64::from(length - 1)) as u16
        };

        if use_easing_curve {
            settings.easing_curve.ease(from, to, progress)
        } else {
            settings.shape(EasingCurve::Linear.ease(from, to, progress))
        }
    }

    // ==================== Navigation ====================

    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Raw segment index as published to the interrupt handler.
    pub fn position(&self) -> i16 {
        self.segment.position()
    }

    /// Index of the keyframe within the snap tolerance of the last evaluated
    /// timestamp, or `-1`.
    pub fn nearest_keyframe(&self) -> i16 {
        self.navigation().nearest_keyframe
    }

    pub fn navigation(&self) -> Navigation {
        Navigation::new(self.segment, self.nearest)
    }

    /// Snap lookup around an arbitrary timestamp, without evaluating.
    pub fn find_nearest(&self, timestamp: u16) -> Option<usize> {
        self.store.nearest_within(timestamp, self.config.snap_tolerance)
    }

    // ==================== Keyframes ====================

    pub fn add_keyframe(
        &mut self,
        timestamp: u16,
        values: [u16; NUM_CHANNELS],
    ) -> Result<InsertOutcome, CapacityError> {
        match self.store.insert(timestamp, values) {
            Ok(outcome) => {
                log::debug!(target: "keyframer", "keyframe at {}: {:?}", timestamp, outcome);
                Ok(outcome)
            }
            Err(err) => {
                log::warn!(target: "keyframer", "keyframe at {} rejected: {}", timestamp, err);
                Err(err)
            }
        }
    }

    pub fn remove_keyframe(&mut self, timestamp: u16) -> bool {
        let removed = self.store.remove(timestamp);
        if removed {
            log::debug!(target: "keyframer", "removed keyframe at {}", timestamp);
        }
        removed
    }

    /// Remove every keyframe. Settings, calibration and flags are kept.
    pub fn clear(&mut self) {
        self.store.clear();
        log::debug!(target: "keyframer", "cleared keyframes");
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.store.get(index)
    }

    pub fn keyframes(&self) -> &KeyframeStore {
        &self.store
    }

    pub fn num_keyframes(&self) -> usize {
        self.store.len()
    }

    /// Edit one channel of the keyframe at `index`.
    ///
    /// Returns `false` if there is no such keyframe.
    pub fn set_keyframe_value(&mut self, index: usize, channel: usize, value: u16) -> bool {
        check_channel(channel);
        match self
            .store
            .get_mut(index)
            .and_then(|values| values.get_mut(channel))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    // ==================== Channels ====================

    /// Level used for `channel` while no keyframes exist. Never stored.
    pub fn set_immediate(&mut self, channel: usize, value: u16) {
        check_channel(channel);
        if let Some(slot) = self.immediate.get_mut(channel) {
            *slot = value;
        }
    }

    pub fn immediate(&self, channel: usize) -> Option<u16> {
        check_channel(channel);
        self.immediate.get(channel).copied()
    }

    /// Level computed by the last [`evaluate`](Self::evaluate).
    pub fn level(&self, channel: usize) -> Option<u16> {
        check_channel(channel);
        self.levels.get(channel).copied()
    }

    pub fn levels(&self) -> [u16; NUM_CHANNELS] {
        self.levels
    }

    /// Device code for the last evaluated level of `channel`.
    ///
    /// Levels between two keyframes were shaped during evaluation. Outside
    /// that range they are raw keyframe or immediate values, and the
    /// channel's response is applied here instead.
    pub fn output_code(&self, channel: usize) -> Option<u16> {
        let level = self.level(channel)?;
        let response = self.settings.get(channel)?.response;
        Some(self.code_for(level, response))
    }

    pub fn output_codes(&self) -> [u16; NUM_CHANNELS] {
        let mut codes = [0; NUM_CHANNELS];
        for (channel, code) in codes.iter_mut().enumerate() {
            *code = self.code_for(self.levels[channel], self.settings[channel].response);
        }
        codes
    }

    fn code_for(&self, level: u16, response: u8) -> u16 {
        match self.segment {
            Segment::Between(_) => GainCodec::to_output_code(level, 0),
            _ => GainCodec::to_output_code(level, response),
        }
    }

    pub fn settings(&self, channel: usize) -> Option<&ChannelSettings> {
        check_channel(channel);
        self.settings.get(channel)
    }

    pub fn settings_mut(&mut self, channel: usize) -> Option<&mut ChannelSettings> {
        check_channel(channel);
        self.settings.get_mut(channel)
    }

    pub fn set_easing_curve(&mut self, channel: usize, curve: EasingCurve) {
        if let Some(settings) = self.settings_mut(channel) {
            settings.easing_curve = curve;
        }
    }

    pub fn set_response(&mut self, channel: usize, response: u8) {
        if let Some(settings) = self.settings_mut(channel) {
            settings.response = response;
        }
    }

    // ==================== Calibration & flags ====================

    pub fn calibrate(&mut self, raw_offset: i32) {
        self.calibration.calibrate(raw_offset);
        log::debug!(target: "keyframer", "calibrated dc offset to {}", raw_offset);
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn dc_offset(&self) -> i32 {
        self.calibration.dc_offset()
    }

    pub fn feature_flags(&self) -> u32 {
        self.feature_flags
    }

    pub fn set_feature_flags(&mut self, flags: u32) {
        self.feature_flags = flags;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Persistence ====================

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            keyframes: self.store.clone(),
            settings: self.settings,
            calibration: self.calibration,
            feature_flags: self.feature_flags,
        }
    }

    /// Replace all persisted state. Navigation is refreshed by the next
    /// [`evaluate`](Self::evaluate).
    pub fn restore(&mut self, snapshot: EngineSnapshot) {
        self.store = snapshot.keyframes;
        self.settings = snapshot.settings;
        self.calibration = snapshot.calibration;
        self.feature_flags = snapshot.feature_flags;
    }
}

#[inline]
fn check_channel(channel: usize) {
    debug_assert!(
        channel < NUM_CHANNELS,
        "channel {channel} out of range (0..{NUM_CHANNELS})"
    );
}
