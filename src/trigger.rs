//! Trigger pulses on keyframe crossings, driven from the timer interrupt
//!
//! Moving close to a keyframe arms the generator; the next change of segment
//! fires a fixed-length pulse. Reads [`Navigation`] only and never touches the
//! engine.

use crate::navigation::{Navigation, NavigationCell};

/// Length of a trigger pulse in timer ticks.
pub const PULSE_DURATION: u16 = 128;

#[derive(Debug, Clone, Default)]
pub struct TriggerGenerator {
    previous_position: Option<i16>,
    previous_nearest: Option<i16>,
    armed: bool,
    pulse_remaining: u16,
}

impl TriggerGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one timer tick and return the trigger output level.
    pub fn tick(&mut self, navigation: Navigation) -> bool {
        if self.previous_position != Some(navigation.position) {
            self.previous_position = Some(navigation.position);
            if self.armed {
                self.pulse_remaining = PULSE_DURATION;
                self.armed = false;
            }
        }

        if self.previous_nearest != Some(navigation.nearest_keyframe) {
            self.previous_nearest = Some(navigation.nearest_keyframe);
            self.armed = true;
        }

        if self.pulse_remaining == 0 {
            return false;
        }
        self.pulse_remaining -= 1;
        true
    }

    /// [`tick`](Self::tick) against the latest published navigation state.
    pub fn poll(&mut self, cell: &NavigationCell) -> bool {
        self.tick(cell.load())
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Segment;

    fn nav(segment: Segment, nearest: Option<usize>) -> Navigation {
        Navigation::new(segment, nearest)
    }

    #[test]
    fn test_no_pulse_without_arming() {
        let mut trigger = TriggerGenerator::new();
        assert!(!trigger.tick(nav(Segment::Between(0), None)));
        // First tick arms on the initial nearest value, nothing fires yet
        assert!(trigger.is_armed());
        assert!(!trigger.tick(nav(Segment::Between(0), None)));
    }

    #[test]
    fn test_crossing_fires_fixed_length_pulse() {
        let mut trigger = TriggerGenerator::new();
        trigger.tick(nav(Segment::Between(0), None));
        trigger.tick(nav(Segment::Between(0), Some(1)));
        assert!(trigger.is_armed());

        let mut high_ticks = 0;
        if trigger.tick(nav(Segment::Between(1), Some(1))) {
            high_ticks += 1;
        }
        for _ in 0..500 {
            if trigger.tick(nav(Segment::Between(1), Some(1))) {
                high_ticks += 1;
            }
        }
        assert_eq!(high_ticks, PULSE_DURATION);
        assert!(!trigger.is_armed());
    }

    #[test]
    fn test_poll_reads_cell() {
        let cell = NavigationCell::new();
        let mut trigger = TriggerGenerator::new();
        assert!(!trigger.poll(&cell));
        cell.publish(nav(Segment::BeforeFirst, Some(0)));
        assert!(trigger.poll(&cell));
    }
}
