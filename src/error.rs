//! Error types

use thiserror::Error;

/// A new keyframe was rejected because the store is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("keyframe store is full ({capacity} keyframes)")]
pub struct CapacityError {
    pub capacity: usize,
}

/// A stored curve byte does not name any [`EasingCurve`](crate::EasingCurve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown easing curve {0}")]
pub struct UnknownCurve(pub u8);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot record: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// Failures of a [`SnapshotBank`](crate::SnapshotBank) operation.
#[derive(Debug, Error)]
pub enum BankError<E> {
    #[error("slot {slot} out of range ({count} slots available)")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("storage failure: {0}")]
    Storage(E),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Keyframes handed to a store were not strictly ascending by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("keyframe {index} is out of order or duplicates its predecessor")]
pub struct UnsortedKeyframes {
    pub index: usize,
}
