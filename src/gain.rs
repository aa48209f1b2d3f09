//! Linear/exponential gain shaping and output code conversion
//!
//! The exponential law approximates an exponential VCA control input:
//! `(B^g - 1) / (B - 1)` with `g` normalized to `0..=1` and `B = 200`.
//! The `response` byte crossfades between the plain linear level and that
//! law, `0` being fully linear and `255` fully exponential.

use crate::curve::FULL_SCALE;

/// Base of the exponential gain law.
pub const EXPONENTIAL_BASE: f32 = 200.0;

/// Stateless conversions from channel levels to shaped levels and device codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GainCodec;

impl GainCodec {
    /// Exponential law over the full 16-bit range, `0 -> 0` and `65535 -> 65535`.
    #[must_use]
    pub fn exponential(gain: u16) -> u16 {
        let g = f32::from(gain) / f32::from(FULL_SCALE);
        let shaped = (EXPONENTIAL_BASE.powf(g) - 1.0) / (EXPONENTIAL_BASE - 1.0);
        (shaped * f32::from(FULL_SCALE))
            .round()
            .clamp(0.0, f32::from(FULL_SCALE)) as u16
    }

    /// Blend of the linear and exponential laws, weighted by `response / 255`.
    #[must_use]
    #[inline]
    pub fn shape(gain: u16, response: u8) -> u16 {
        if response == 0 {
            return gain;
        }
        let linear = i32::from(gain);
        let exponential = i32::from(Self::exponential(gain));
        let blended = linear + (exponential - linear) * i32::from(response) / 255;
        blended.clamp(0, i32::from(FULL_SCALE)) as u16
    }

    /// Device code for a channel level.
    ///
    /// The VCA attenuates as its control voltage rises, so the code runs from
    /// `65535` (silent) down to `0` (unity gain).
    #[must_use]
    #[inline]
    pub fn to_output_code(gain: u16, response: u8) -> u16 {
        FULL_SCALE - Self::shape(gain, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_response_is_affine() {
        assert_eq!(GainCodec::to_output_code(0, 0), 65535);
        assert_eq!(GainCodec::to_output_code(65535, 0), 0);
        assert_eq!(GainCodec::to_output_code(1000, 0), 64535);
        assert_eq!(
            GainCodec::to_output_code(20000, 0) - GainCodec::to_output_code(30000, 0),
            10000
        );
    }

    #[test]
    fn test_exponential_endpoints() {
        assert_eq!(GainCodec::exponential(0), 0);
        assert_eq!(GainCodec::exponential(65535), 65535);
        // Exponential law stays well below linear at mid scale
        assert!(GainCodec::exponential(32768) < 8000);
    }

    #[test]
    fn test_full_response_is_exponential() {
        for gain in [0u16, 1234, 32768, 50000, 65535] {
            assert_eq!(GainCodec::shape(gain, 255), GainCodec::exponential(gain));
        }
    }

    #[test]
    fn test_intermediate_response_blends() {
        let gain = 32768;
        let linear = GainCodec::shape(gain, 0);
        let half = GainCodec::shape(gain, 128);
        let full = GainCodec::shape(gain, 255);
        assert!(full < half && half < linear);
    }

    #[test]
    fn test_total_over_domain() {
        for gain in (0..=u16::MAX).step_by(257) {
            for response in [0u8, 1, 64, 200, 255] {
                let _ = GainCodec::to_output_code(gain, response);
            }
        }
    }
}
