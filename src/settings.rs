//! Per-channel interpolation settings

use crate::curve::EasingCurve;
use crate::gain::GainCodec;
use serde::{Deserialize, Serialize};

/// How one channel moves between keyframes and how its level is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub easing_curve: EasingCurve,
    /// `0` is a fully linear response, `255` fully exponential.
    pub response: u8,
}

impl ChannelSettings {
    pub fn new(easing_curve: EasingCurve, response: u8) -> Self {
        Self {
            easing_curve,
            response,
        }
    }

    /// Keep the top 8 bits of a raw potentiometer reading.
    #[must_use]
    pub fn response_from_pot(value: u16) -> u8 {
        (value >> 8) as u8
    }

    /// Apply this channel's response law to a level.
    #[must_use]
    #[inline]
    pub fn shape(&self, level: u16) -> u16 {
        GainCodec::shape(level, self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_linear() {
        let settings = ChannelSettings::default();
        assert_eq!(settings.easing_curve, EasingCurve::Linear);
        assert_eq!(settings.response, 0);
        assert_eq!(settings.shape(12345), 12345);
    }

    #[test]
    fn test_response_from_pot() {
        assert_eq!(ChannelSettings::response_from_pot(0), 0);
        assert_eq!(ChannelSettings::response_from_pot(0x80FF), 0x80);
        assert_eq!(ChannelSettings::response_from_pot(u16::MAX), 255);
    }
}
