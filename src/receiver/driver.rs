//! # Receiver Driver Contract
//!
//! The polymorphism point of the input subsystem: every protocol backend
//! (DSM, fixed-resolution serial protocols, pulse-width variants, software
//! sources) exposes the same non-blocking read contract, and the flight core
//! never learns which backend serves it.

/// Outcome of reading one input channel.
///
/// Decode errors and link loss are absorbed into this vocabulary; no backend
/// ever raises an error to the flight core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRead {
    /// Raw decoded channel value in the protocol's numeric range
    Value(u16),
    /// Failsafe condition, or the channel never synchronized
    Timeout,
    /// Channel or handle not available; never stored, only reported
    Invalid,
}

impl ChannelRead {
    /// The decoded value, if one is present.
    pub fn value(self) -> Option<u16> {
        match self {
            ChannelRead::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Uniform read interface implemented by every receiver backend.
///
/// `read` must be pure and non-blocking: safe to call from any context at
/// any rate, including the flight core's own scheduling loop.
pub trait ReceiverDriver: Send + Sync {
    /// Read the latest value of `channel` (zero-based).
    fn read(&self, channel: usize) -> ChannelRead;

    /// Number of channels this backend tracks.
    fn num_channels(&self) -> usize;
}

/// Feedback returned to the transport from the byte-received callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxFeedback {
    /// Bytes accepted from the transport buffer (always the full length)
    pub bytes_consumed: usize,
    /// Capacity hint for the next delivery
    pub headroom: usize,
    /// Whether a scheduling yield is requested (never, for this subsystem)
    pub yield_requested: bool,
}
