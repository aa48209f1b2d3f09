//! Named snapshot slots on caller-owned non-volatile storage
//!
//! The bank only moves [`RECORD_SIZE`] byte blocks through a
//! [`SlotStorage`]; flash/EEPROM drivers implement that trait.

use crate::error::BankError;
use crate::snapshot::{self, EngineSnapshot, RECORD_SIZE};
use std::convert::Infallible;

/// Block device holding one snapshot record per slot.
pub trait SlotStorage {
    type Error;

    fn slot_count(&self) -> usize;

    fn read_block(&mut self, slot: usize, buffer: &mut [u8; RECORD_SIZE]) -> Result<(), Self::Error>;

    fn write_block(&mut self, slot: usize, buffer: &[u8; RECORD_SIZE]) -> Result<(), Self::Error>;
}

/// RAM-backed storage, erased to `0xFF` like fresh flash.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    blocks: Vec<[u8; RECORD_SIZE]>,
}

impl MemoryStorage {
    pub fn new(slot_count: usize) -> Self {
        Self {
            blocks: vec![[0xFF; RECORD_SIZE]; slot_count],
        }
    }

    /// Raw bytes of a slot, for inspection or corruption in tests.
    pub fn block_mut(&mut self, slot: usize) -> Option<&mut [u8; RECORD_SIZE]> {
        self.blocks.get_mut(slot)
    }

    #[inline]
    fn check_slot(&self, slot: usize) {
        debug_assert!(
            slot < self.blocks.len(),
            "slot {slot} out of range (0..{})",
            self.blocks.len()
        );
    }
}

impl SlotStorage for MemoryStorage {
    type Error = Infallible;

    fn slot_count(&self) -> usize {
        self.blocks.len()
    }

    fn read_block(&mut self, slot: usize, buffer: &mut [u8; RECORD_SIZE]) -> Result<(), Self::Error> {
        self.check_slot(slot);
        if let Some(block) = self.blocks.get(slot) {
            buffer.copy_from_slice(block);
        }
        Ok(())
    }

    fn write_block(&mut self, slot: usize, buffer: &[u8; RECORD_SIZE]) -> Result<(), Self::Error> {
        self.check_slot(slot);
        if let Some(block) = self.blocks.get_mut(slot) {
            block.copy_from_slice(buffer);
        }
        Ok(())
    }
}

/// Saves and loads engine snapshots by slot number.
#[derive(Debug)]
pub struct SnapshotBank<S> {
    storage: S,
}

impl<S: SlotStorage> SnapshotBank<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn slot_count(&self) -> usize {
        self.storage.slot_count()
    }

    pub fn save(&mut self, slot: usize, snapshot: &EngineSnapshot) -> Result<(), BankError<S::Error>> {
        self.check_slot(slot)?;
        let bytes = snapshot::serialize(snapshot)?;
        self.storage
            .write_block(slot, &bytes)
            .map_err(BankError::Storage)?;
        log::debug!(
            target: "keyframer",
            "saved slot {}: {} keyframes",
            slot,
            snapshot.keyframes.len()
        );
        Ok(())
    }

    /// Load a slot, substituting [`EngineSnapshot::default`] when the record
    /// is corrupt, from another layout version, or was never written.
    pub fn load(&mut self, slot: usize) -> Result<EngineSnapshot, BankError<S::Error>> {
        self.check_slot(slot)?;
        let mut bytes = [0u8; RECORD_SIZE];
        self.storage
            .read_block(slot, &mut bytes)
            .map_err(BankError::Storage)?;

        match snapshot::deserialize(&bytes) {
            Some(snapshot) => Ok(snapshot),
            None => {
                log::warn!(target: "keyframer", "slot {} holds no valid snapshot, using defaults", slot);
                Ok(EngineSnapshot::default())
            }
        }
    }

    /// Overwrite a slot with an erased block so it loads as defaults.
    pub fn erase(&mut self, slot: usize) -> Result<(), BankError<S::Error>> {
        self.check_slot(slot)?;
        self.storage
            .write_block(slot, &[0xFF; RECORD_SIZE])
            .map_err(BankError::Storage)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn check_slot(&self, slot: usize) -> Result<(), BankError<S::Error>> {
        let count = self.storage.slot_count();
        if slot < count {
            Ok(())
        } else {
            Err(BankError::SlotOutOfRange { slot, count })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::EasingCurve;
    use crate::settings::ChannelSettings;

    fn snapshot_with(timestamp: u16) -> EngineSnapshot {
        let mut snapshot = EngineSnapshot::default();
        snapshot.keyframes.insert(timestamp, [1, 2, 3, 4]).unwrap();
        snapshot.settings[2] = ChannelSettings::new(EasingCurve::InQuartic, 99);
        snapshot.feature_flags = 1;
        snapshot
    }

    #[test]
    fn test_fresh_slot_loads_defaults() {
        let mut bank = SnapshotBank::new(MemoryStorage::new(4));
        assert_eq!(bank.load(0).unwrap(), EngineSnapshot::default());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut bank = SnapshotBank::new(MemoryStorage::new(4));
        bank.save(1, &snapshot_with(100)).unwrap();
        bank.save(3, &snapshot_with(300)).unwrap();

        assert_eq!(bank.load(1).unwrap(), snapshot_with(100));
        assert_eq!(bank.load(3).unwrap(), snapshot_with(300));
        assert_eq!(bank.load(2).unwrap(), EngineSnapshot::default());
    }

    #[test]
    fn test_corrupt_slot_loads_defaults() {
        let mut bank = SnapshotBank::new(MemoryStorage::new(1));
        bank.save(0, &snapshot_with(100)).unwrap();
        bank.storage_mut().block_mut(0).unwrap()[0] ^= 0xFF;
        assert_eq!(bank.load(0).unwrap(), EngineSnapshot::default());
    }

    #[test]
    fn test_erase() {
        let mut bank = SnapshotBank::new(MemoryStorage::new(2));
        bank.save(0, &snapshot_with(100)).unwrap();
        bank.erase(0).unwrap();
        assert_eq!(bank.load(0).unwrap(), EngineSnapshot::default());
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new(2);
        let mut block = [0u8; RECORD_SIZE];
        block[0] = 0x42;
        storage.write_block(1, &block).unwrap();

        let mut read = [0u8; RECORD_SIZE];
        storage.read_block(1, &mut read).unwrap();
        assert_eq!(read, block);
        storage.read_block(0, &mut read).unwrap();
        assert_eq!(read, [0xFF; RECORD_SIZE]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "slot 2 out of range")]
    fn test_memory_storage_rejects_out_of_range_read() {
        let mut storage = MemoryStorage::new(2);
        let mut buffer = [0u8; RECORD_SIZE];
        let _ = storage.read_block(2, &mut buffer);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "slot 7 out of range")]
    fn test_memory_storage_rejects_out_of_range_write() {
        let mut storage = MemoryStorage::new(2);
        let _ = storage.write_block(7, &[0u8; RECORD_SIZE]);
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut bank = SnapshotBank::new(MemoryStorage::new(2));
        assert!(matches!(
            bank.load(2),
            Err(BankError::SlotOutOfRange { slot: 2, count: 2 })
        ));
        assert!(matches!(
            bank.save(5, &EngineSnapshot::default()),
            Err(BankError::SlotOutOfRange { slot: 5, count: 2 })
        ));
    }
}
