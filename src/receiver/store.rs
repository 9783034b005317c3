//! # Channel Store
//!
//! Fixed-size array of the latest decoded channel values, shared lock-free
//! between the decoder task and any number of readers.
//!
//! Slots hold either a raw protocol value or the TIMEOUT sentinel. A slot
//! not touched by the current frame keeps its previous value, so partial
//! updates are tolerated by design. Each slot has a single writer (the
//! decoder task, plus the bulk failsafe reset from the same task), so
//! relaxed ordering is sufficient.

use std::sync::atomic::{AtomicU32, Ordering};

use super::driver::ChannelRead;

/// Raw slot encoding of the TIMEOUT sentinel, outside any u16 value range
const RAW_TIMEOUT: u32 = u32::MAX;

/// Lock-free store of per-channel raw values with sentinel semantics.
///
/// Created once at device initialization with every slot at TIMEOUT, and
/// valid for the process lifetime.
#[derive(Debug)]
pub struct ChannelStore {
    slots: Box<[AtomicU32]>,
}

impl ChannelStore {
    /// Create a store with `num_channels` slots, all at TIMEOUT.
    pub fn new(num_channels: usize) -> Self {
        let slots = (0..num_channels)
            .map(|_| AtomicU32::new(RAW_TIMEOUT))
            .collect();
        Self { slots }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store a decoded value at `channel`.
    ///
    /// Out-of-range writes are ignored; the wire can encode more channel
    /// indices than the store tracks.
    pub fn write(&self, channel: usize, value: u16) {
        if let Some(slot) = self.slots.get(channel) {
            slot.store(u32::from(value), Ordering::Relaxed);
        }
    }

    /// Bulk-set every slot to TIMEOUT (failsafe, or device reset).
    pub fn reset_to_timeout(&self) {
        for slot in self.slots.iter() {
            slot.store(RAW_TIMEOUT, Ordering::Relaxed);
        }
    }

    /// Read the latest value of `channel`.
    ///
    /// Returns `Invalid` for an out-of-range channel and `Timeout` while the
    /// slot holds the failsafe sentinel.
    pub fn read(&self, channel: usize) -> ChannelRead {
        match self.slots.get(channel) {
            None => ChannelRead::Invalid,
            Some(slot) => match slot.load(Ordering::Relaxed) {
                RAW_TIMEOUT => ChannelRead::Timeout,
                raw => ChannelRead::Value(raw as u16),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_reads_timeout() {
        let store = ChannelStore::new(12);
        assert_eq!(store.len(), 12);
        for ch in 0..12 {
            assert_eq!(store.read(ch), ChannelRead::Timeout);
        }
    }

    #[test]
    fn test_out_of_range_read_is_invalid() {
        let store = ChannelStore::new(12);
        assert_eq!(store.read(12), ChannelRead::Invalid);
        assert_eq!(store.read(usize::MAX), ChannelRead::Invalid);
    }

    #[test]
    fn test_write_then_read() {
        let store = ChannelStore::new(12);
        store.write(3, 1024);
        assert_eq!(store.read(3), ChannelRead::Value(1024));

        // Other slots untouched
        assert_eq!(store.read(2), ChannelRead::Timeout);
        assert_eq!(store.read(4), ChannelRead::Timeout);
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let store = ChannelStore::new(12);
        store.write(15, 500);
        assert_eq!(store.read(15), ChannelRead::Invalid);
    }

    #[test]
    fn test_full_u16_range_is_representable() {
        // 0xFFFF is a legal raw value, distinct from the TIMEOUT sentinel
        let store = ChannelStore::new(1);
        store.write(0, 0xFFFF);
        assert_eq!(store.read(0), ChannelRead::Value(0xFFFF));
    }

    #[test]
    fn test_reset_to_timeout_clears_all_slots() {
        let store = ChannelStore::new(4);
        for ch in 0..4 {
            store.write(ch, 100 + ch as u16);
        }
        store.reset_to_timeout();
        for ch in 0..4 {
            assert_eq!(store.read(ch), ChannelRead::Timeout);
        }
    }
}
