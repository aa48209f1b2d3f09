//! Easing curves for keyframe interpolation
//!
//! Curves operate on 16-bit fixed point: a progress of `0` is the start of a
//! segment and [`FULL_SCALE`] is its end. Both endpoints are returned exactly,
//! whatever the curve.

use crate::error::UnknownCurve;
use serde::{Deserialize, Serialize};

/// Full-scale value shared by progress fractions and channel values.
pub const FULL_SCALE: u16 = u16::MAX;

const FULL_SCALE_I64: i64 = FULL_SCALE as i64;

/// Shape of the transition between two keyframes on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum EasingCurve {
    /// Holds the start value until the very end of the segment.
    Step = 0,
    #[default]
    Linear = 1,
    InQuartic = 2,
    OutQuartic = 3,
    /// Half-cosine ease in-out.
    Sine = 4,
    /// Damped overshoot that settles on the target.
    Bounce = 5,
}

impl EasingCurve {
    pub const ALL: [EasingCurve; 6] = [
        Self::Step,
        Self::Linear,
        Self::InQuartic,
        Self::OutQuartic,
        Self::Sine,
        Self::Bounce,
    ];

    /// Interpolate between `from` and `to`.
    ///
    /// `progress` is a fraction of [`FULL_SCALE`]. Results that overshoot the
    /// 16-bit range are clamped.
    #[must_use]
    #[inline]
    pub fn ease(&self, from: u16, to: u16, progress: u16) -> u16 {
        match progress {
            0 => return from,
            FULL_SCALE => return to,
            _ => {}
        }

        let p = i64::from(progress);
        let eased = match self {
            EasingCurve::Step => return from,
            EasingCurve::Linear => p,
            EasingCurve::InQuartic => quartic_in(progress),
            EasingCurve::OutQuartic => FULL_SCALE_I64 - quartic_in(FULL_SCALE - progress),
            EasingCurve::Sine => {
                let t = p as f64 / FULL_SCALE_I64 as f64;
                let e = (1.0 - (core::f64::consts::PI * t).cos()) * 0.5;
                (e * FULL_SCALE_I64 as f64).round() as i64
            }
            EasingCurve::Bounce => {
                let t = p as f64 / FULL_SCALE_I64 as f64;
                let decay = (1.0 - t) * (1.0 - t);
                let e = 1.0 - decay * (3.0 * core::f64::consts::PI * t).cos();
                (e * FULL_SCALE_I64 as f64).round() as i64
            }
        };

        let from_i = i64::from(from);
        let delta = i64::from(to) - from_i;
        let value = from_i + div_round(delta * eased, FULL_SCALE_I64);
        value.clamp(0, FULL_SCALE_I64) as u16
    }

    /// Map a raw potentiometer reading onto one of the six curves.
    #[must_use]
    pub fn from_pot(value: u16) -> Self {
        let index = (u32::from(value) * Self::ALL.len() as u32) >> 16;
        Self::ALL[index as usize]
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EasingCurve::Step => "Step",
            EasingCurve::Linear => "Linear",
            EasingCurve::InQuartic => "Quartic In",
            EasingCurve::OutQuartic => "Quartic Out",
            EasingCurve::Sine => "Sine",
            EasingCurve::Bounce => "Bounce",
        }
    }
}

impl TryFrom<u8> for EasingCurve {
    type Error = UnknownCurve;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(UnknownCurve(value))
    }
}

impl From<EasingCurve> for u8 {
    fn from(curve: EasingCurve) -> Self {
        curve as u8
    }
}

impl std::fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-function form of [`EasingCurve::ease`].
#[must_use]
#[inline]
pub fn ease(curve: EasingCurve, from: u16, to: u16, progress: u16) -> u16 {
    curve.ease(from, to, progress)
}

/// `p^4` rescaled to full scale. `65535^4` still fits in a `u64`.
#[inline]
fn quartic_in(progress: u16) -> i64 {
    let p = u64::from(progress);
    let full = u64::from(FULL_SCALE);
    let p2 = p * p;
    ((p2 * p2) / (full * full * full)) as i64
}

/// Signed division rounding half away from zero.
#[inline]
fn div_round(numerator: i64, denominator: i64) -> i64 {
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        (numerator - denominator / 2) / denominator
    }
}
