//! Keyframe storage
//!
//! A fixed-capacity collection of keyframes kept sorted by timestamp, with
//! at most one keyframe per timestamp. Backed by an inline array, so it never
//! allocates and every operation is bounded by [`MAX_KEYFRAMES`].

use crate::error::{CapacityError, UnsortedKeyframes};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Number of output channels driven by each keyframe.
pub const NUM_CHANNELS: usize = 4;

/// Maximum number of keyframes held by a store.
pub const MAX_KEYFRAMES: usize = 64;

/// A stored position on the timestamp axis with one value per channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Keyframe {
    pub timestamp: u16,
    pub values: [u16; NUM_CHANNELS],
}

impl Keyframe {
    pub fn new(timestamp: u16, values: [u16; NUM_CHANNELS]) -> Self {
        Self { timestamp, values }
    }
}

/// Result of a successful [`KeyframeStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new keyframe was added at this index.
    Inserted(usize),
    /// The keyframe at this index already had the timestamp; its values were overwritten.
    Replaced(usize),
}

impl InsertOutcome {
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Inserted(index) | Self::Replaced(index) => *index,
        }
    }
}

/// Sorted, duplicate-free, fixed-capacity keyframe collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "ArrayVec<Keyframe, MAX_KEYFRAMES>",
    into = "ArrayVec<Keyframe, MAX_KEYFRAMES>"
)]
pub struct KeyframeStore {
    keyframes: ArrayVec<Keyframe, MAX_KEYFRAMES>,
}

impl KeyframeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyframe, or overwrite the values of the one sharing its timestamp.
    ///
    /// Replacing always succeeds, even when the store is full.
    pub fn insert(
        &mut self,
        timestamp: u16,
        values: [u16; NUM_CHANNELS],
    ) -> Result<InsertOutcome, CapacityError> {
        match self.search(timestamp) {
            Ok(index) => {
                self.keyframes[index].values = values;
                Ok(InsertOutcome::Replaced(index))
            }
            Err(index) => self
                .keyframes
                .try_insert(index, Keyframe::new(timestamp, values))
                .map(|()| InsertOutcome::Inserted(index))
                .map_err(|_| CapacityError {
                    capacity: MAX_KEYFRAMES,
                }),
        }
    }

    /// Remove the keyframe at `timestamp`. Returns `false` if there is none.
    pub fn remove(&mut self, timestamp: u16) -> bool {
        match self.search(timestamp) {
            Ok(index) => {
                self.keyframes.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Binary search by timestamp: `Ok(index)` on a match, else `Err(insertion point)`.
    pub fn search(&self, timestamp: u16) -> Result<usize, usize> {
        self.keyframes
            .binary_search_by_key(&timestamp, |keyframe| keyframe.timestamp)
    }

    /// Index of the keyframe closest to `timestamp`, if it lies within `tolerance`.
    ///
    /// Only the two keyframes bracketing `timestamp` are candidates. When they
    /// are equally distant the earlier one wins.
    pub fn nearest_within(&self, timestamp: u16, tolerance: u16) -> Option<usize> {
        let right = self
            .keyframes
            .partition_point(|keyframe| keyframe.timestamp < timestamp);
        let distance = |index: usize| self.keyframes[index].timestamp.abs_diff(timestamp);

        let candidate = match (right.checked_sub(1), right < self.keyframes.len()) {
            (None, false) => return None,
            (Some(left), false) => left,
            (None, true) => right,
            (Some(left), true) => {
                if distance(left) <= distance(right) {
                    left
                } else {
                    right
                }
            }
        };

        (distance(candidate) <= tolerance).then_some(candidate)
    }

    /// Number of keyframes with a timestamp less than or equal to `timestamp`.
    pub fn upper_bound(&self, timestamp: u16) -> usize {
        self.keyframes
            .partition_point(|keyframe| keyframe.timestamp <= timestamp)
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keyframes.is_full()
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Mutable access to a keyframe's values.
    ///
    /// Only the values are exposed so the timestamp order cannot be broken.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u16; NUM_CHANNELS]> {
        self.keyframes.get_mut(index).map(|keyframe| &mut keyframe.values)
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keyframes.first()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe> {
        self.keyframes.iter()
    }

    pub fn as_slice(&self) -> &[Keyframe] {
        &self.keyframes
    }
}

impl TryFrom<ArrayVec<Keyframe, MAX_KEYFRAMES>> for KeyframeStore {
    type Error = UnsortedKeyframes;

    /// Adopt keyframes that must already be strictly ascending by timestamp.
    fn try_from(keyframes: ArrayVec<Keyframe, MAX_KEYFRAMES>) -> Result<Self, Self::Error> {
        match keyframes
            .windows(2)
            .position(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            Some(index) => Err(UnsortedKeyframes { index: index + 1 }),
            None => Ok(Self { keyframes }),
        }
    }
}

impl From<KeyframeStore> for ArrayVec<Keyframe, MAX_KEYFRAMES> {
    fn from(store: KeyframeStore) -> Self {
        store.keyframes
    }
}

impl<'a> IntoIterator for &'a KeyframeStore {
    type Item = &'a Keyframe;
    type IntoIter = std::slice::Iter<'a, Keyframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
