//! Engine tuning

use serde::{Deserialize, Serialize};

/// Distance within which the play-head snaps to a keyframe for editing.
pub const DEFAULT_SNAP_TOLERANCE: u16 = 2048;

/// Ticks in one rise-and-fall cycle of the settings preview animation.
pub const ANIMATION_PERIOD: u32 = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub snap_tolerance: u16,
    pub animation_period: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            animation_period: ANIMATION_PERIOD,
        }
    }
}

impl EngineConfig {
    pub fn with_snap_tolerance(mut self, tolerance: u16) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    /// Periods shorter than two ticks cannot hold a rise and a fall and are raised to two.
    pub fn with_animation_period(mut self, period: u32) -> Self {
        self.animation_period = period.max(2);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"snap_tolerance":100}"#).unwrap();
        assert_eq!(config.snap_tolerance, 100);
        assert_eq!(config.animation_period, ANIMATION_PERIOD);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_snap_tolerance(0)
            .with_animation_period(0);
        assert_eq!(config.snap_tolerance, 0);
        assert_eq!(config.animation_period, 2);
    }
}
