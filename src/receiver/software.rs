//! # Software Receiver Backend
//!
//! A receiver backend fed by software instead of a radio link: ground
//! control, simulation, or tests. Implements the same read contract as the
//! protocol backends, which is what lets the flight core stay oblivious to
//! where its channels come from.

use std::sync::Arc;

use super::driver::{ChannelRead, ReceiverDriver};
use super::store::ChannelStore;

/// Receiver whose channels are written directly by the application.
///
/// Channels start at TIMEOUT until first written, and can be bulk-reset to
/// TIMEOUT to simulate link loss.
///
/// # Examples
///
/// ```
/// use dsm_link::receiver::driver::{ChannelRead, ReceiverDriver};
/// use dsm_link::receiver::software::SoftwareReceiver;
///
/// let rcvr = SoftwareReceiver::new(8);
/// rcvr.set_channel(0, 1500);
/// assert_eq!(rcvr.read(0), ChannelRead::Value(1500));
/// assert_eq!(rcvr.read(1), ChannelRead::Timeout);
/// ```
#[derive(Debug)]
pub struct SoftwareReceiver {
    store: Arc<ChannelStore>,
}

impl SoftwareReceiver {
    /// Create a software receiver with `num_channels` slots, all at TIMEOUT.
    pub fn new(num_channels: usize) -> Self {
        Self {
            store: Arc::new(ChannelStore::new(num_channels)),
        }
    }

    /// Set one channel value. Out-of-range writes are ignored.
    pub fn set_channel(&self, channel: usize, value: u16) {
        self.store.write(channel, value);
    }

    /// Set the first `values.len()` channels in one call.
    pub fn set_channels(&self, values: &[u16]) {
        for (channel, &value) in values.iter().enumerate() {
            self.store.write(channel, value);
        }
    }

    /// Reset every channel to TIMEOUT.
    pub fn reset_to_failsafe(&self) {
        self.store.reset_to_timeout();
    }
}

impl ReceiverDriver for SoftwareReceiver {
    fn read(&self, channel: usize) -> ChannelRead {
        self.store.read(channel)
    }

    fn num_channels(&self) -> usize {
        self.store.len()
    }
}
