//! Play-head navigation state shared with the timer interrupt
//!
//! The main loop writes `position` and `nearest_keyframe` on every
//! evaluation while the timer interrupt reads them to generate triggers.
//! Both fields live in a single `AtomicU32` so a reader always sees a pair
//! that was published together.

use std::sync::atomic::{AtomicU32, Ordering};

/// `position` while the store is empty.
pub const NO_POSITION: i16 = i16::MIN;

/// `nearest_keyframe` when no keyframe is within the snap tolerance.
pub const NO_KEYFRAME: i16 = -1;

/// Where the play-head sits relative to the stored keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Segment {
    /// No keyframes are stored.
    #[default]
    Empty,
    /// Before the first keyframe.
    BeforeFirst,
    /// Between keyframe `i` (inclusive) and keyframe `i + 1`.
    Between(usize),
    /// At or after the last keyframe, whose index is carried.
    AfterLast(usize),
}

impl Segment {
    /// Raw position: `NO_POSITION`, `-1` before the first keyframe, else the
    /// index of the keyframe starting the segment.
    #[must_use]
    pub fn position(&self) -> i16 {
        match self {
            Segment::Empty => NO_POSITION,
            Segment::BeforeFirst => -1,
            Segment::Between(index) | Segment::AfterLast(index) => *index as i16,
        }
    }
}

/// The pair read by the interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Navigation {
    pub position: i16,
    pub nearest_keyframe: i16,
}

impl Navigation {
    pub const IDLE: Navigation = Navigation {
        position: NO_POSITION,
        nearest_keyframe: NO_KEYFRAME,
    };

    pub fn new(segment: Segment, nearest: Option<usize>) -> Self {
        Self {
            position: segment.position(),
            nearest_keyframe: nearest.map_or(NO_KEYFRAME, |index| index as i16),
        }
    }

    #[must_use]
    pub fn nearest(&self) -> Option<usize> {
        usize::try_from(self.nearest_keyframe).ok()
    }

    #[inline]
    fn pack(self) -> u32 {
        (u32::from(self.position as u16) << 16) | u32::from(self.nearest_keyframe as u16)
    }

    #[inline]
    fn unpack(word: u32) -> Self {
        Self {
            position: (word >> 16) as u16 as i16,
            nearest_keyframe: word as u16 as i16,
        }
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Single-word cell holding the last published [`Navigation`].
///
/// Usable as a `static`; the engine and the interrupt handler each hold a
/// shared reference.
#[derive(Debug)]
pub struct NavigationCell {
    word: AtomicU32,
}

impl NavigationCell {
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(((NO_POSITION as u16 as u32) << 16) | (NO_KEYFRAME as u16 as u32)),
        }
    }

    #[inline]
    pub fn publish(&self, navigation: Navigation) {
        self.word.store(navigation.pack(), Ordering::Release);
    }

    #[inline]
    pub fn load(&self) -> Navigation {
        Navigation::unpack(self.word.load(Ordering::Acquire))
    }
}

impl Default for NavigationCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_cell_is_idle() {
        assert_eq!(NavigationCell::new().load(), Navigation::IDLE);
        assert_eq!(Navigation::IDLE.nearest(), None);
    }

    #[test]
    fn test_publish_round_trips_signed_fields() {
        let cell = NavigationCell::new();
        for navigation in [
            Navigation::new(Segment::BeforeFirst, None),
            Navigation::new(Segment::Between(12), Some(13)),
            Navigation::new(Segment::AfterLast(63), Some(63)),
            Navigation::new(Segment::Empty, None),
        ] {
            cell.publish(navigation);
            assert_eq!(cell.load(), navigation);
        }
    }

    #[test]
    fn test_segment_positions() {
        assert_eq!(Segment::Empty.position(), NO_POSITION);
        assert_eq!(Segment::BeforeFirst.position(), -1);
        assert_eq!(Segment::Between(3).position(), 3);
        assert_eq!(Segment::AfterLast(7).position(), 7);
    }

    #[test]
    fn test_reader_never_sees_torn_pair() {
        // The writer only ever publishes pairs with nearest == position
        let cell = Arc::new(NavigationCell::new());
        cell.publish(Navigation::new(Segment::Between(0), Some(0)));

        let reader = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for _ in 0..100_000 {
                    let navigation = cell.load();
                    assert_eq!(navigation.position, navigation.nearest_keyframe);
                }
            })
        };

        for i in 0..100_000usize {
            let index = i % 64;
            cell.publish(Navigation::new(Segment::Between(index), Some(index)));
        }
        reader.join().unwrap();
    }
}
