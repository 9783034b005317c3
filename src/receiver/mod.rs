//! # Receiver Interface Module
//!
//! Uniform receiver-driver contract shared by all protocol backends.
//!
//! This module handles:
//! - The [`ReceiverDriver`](driver::ReceiverDriver) read contract
//! - The lock-free channel store with sentinel semantics
//! - The channel-group registry mapping logical groups to backends
//! - A software/simulation backend for testing and ground control

pub mod driver;
pub mod store;
pub mod registry;
pub mod software;
