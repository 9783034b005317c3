//! # Receiver Driver Registry
//!
//! Maps logical channel groups to concrete receiver backends.
//!
//! The registry owns every backend in an arena and hands out opaque
//! handles; the arena, not any magic constant, is authoritative for handle
//! validity. Group bindings are chosen once at board configuration time,
//! and the flight core looks up only by group, oblivious to which protocol
//! backend serves it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::driver::{ChannelRead, ReceiverDriver};

/// Logical channel group an input backend can serve.
///
/// Mirrors the manual-control channel-group options of the flight core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelGroup {
    /// Spektrum/JR DSM satellite stream
    Dsm,
    /// Pulse-position modulation input
    Ppm,
    /// Per-channel pulse-width input
    Pwm,
    /// Software/simulation source (ground control station)
    Software,
}

/// Opaque handle to a registered receiver backend.
///
/// Can only be obtained from [`ReceiverRegistry::register`], so an
/// arbitrary integer can never be mistaken for a live device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverHandle(usize);

/// Arena of receiver backends plus the group-to-backend map.
///
/// Constructed once at startup and passed by reference to the flight core;
/// there is no process-wide ambient state.
#[derive(Default)]
pub struct ReceiverRegistry {
    devices: Vec<Arc<dyn ReceiverDriver>>,
    groups: HashMap<ChannelGroup, ReceiverHandle>,
}

impl ReceiverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend to the arena and return its handle.
    pub fn register(&mut self, driver: Arc<dyn ReceiverDriver>) -> ReceiverHandle {
        let handle = ReceiverHandle(self.devices.len());
        self.devices.push(driver);
        handle
    }

    /// Bind a logical channel group to a registered backend.
    ///
    /// Rebinding a group replaces the previous backend. A handle from
    /// another registry is a programming error: asserts in debug builds,
    /// degrades to a logged no-op in release builds.
    pub fn bind_group(&mut self, group: ChannelGroup, handle: ReceiverHandle) {
        debug_assert!(handle.0 < self.devices.len(), "handle not from this registry");
        if handle.0 >= self.devices.len() {
            warn!(?group, "ignoring group binding to unknown receiver handle");
            return;
        }
        self.groups.insert(group, handle);
    }

    /// Read a channel through a backend handle.
    ///
    /// A handle that does not index into the arena yields `Invalid` rather
    /// than undefined behavior (and asserts in debug builds).
    pub fn get(&self, handle: ReceiverHandle, channel: usize) -> ChannelRead {
        debug_assert!(handle.0 < self.devices.len(), "handle not from this registry");
        match self.devices.get(handle.0) {
            Some(driver) => driver.read(channel),
            None => ChannelRead::Invalid,
        }
    }

    /// Read a channel through a group binding.
    ///
    /// An unbound group yields `Invalid` for every channel.
    pub fn get_group(&self, group: ChannelGroup, channel: usize) -> ChannelRead {
        match self.groups.get(&group) {
            Some(&handle) => self.get(handle, channel),
            None => ChannelRead::Invalid,
        }
    }

    /// Backend bound to `group`, if any.
    pub fn group_handle(&self, group: ChannelGroup) -> Option<ReceiverHandle> {
        self.groups.get(&group).copied()
    }
}
